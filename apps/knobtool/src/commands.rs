use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use host_graph::{all_class_knobs, all_classes, find_all_knob_names, Scene};
use knob_setter::{apply_value_to_class, ApplyReport, CoercionTable};
use ledger::{count_ledger, ConfirmRemoval, NameLedger};
use serde::Serialize;
use shared::{
    domain::KnobKind,
    error::ErrorCode,
};
use tracing::warn;

use crate::config::Settings;

/// Prompts on the terminal before each removal. Anything but an explicit
/// yes keeps the file.
pub struct TerminalConfirm;

impl ConfirmRemoval for TerminalConfirm {
    fn confirm(&mut self, path: &Path) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(format!("Would you like to delete {}?", path.display()))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

fn load_scene(path: &Path) -> Result<Scene> {
    Scene::load(path).with_context(|| format!("failed to load scene '{}'", path.display()))
}

pub fn gather(
    settings: &Settings,
    ledger: &NameLedger,
    scene_path: &Path,
    recursive: bool,
    directory: Option<&Path>,
    basename: Option<&str>,
    out: &mut dyn Write,
) -> Result<PathBuf> {
    let scene = load_scene(scene_path)?;
    let names = find_all_knob_names(&scene, recursive || settings.recursive);
    let directory = directory.unwrap_or(settings.ledger_dir.as_path());

    let path = ledger
        .write(&names, directory, basename)
        .context("failed to write knob ledger")?;
    writeln!(out, "{}", path.display())?;
    print_counts(&path, out)?;
    Ok(path)
}

pub fn count(path: &Path, out: &mut dyn Write) -> Result<()> {
    print_counts(path, out)
}

fn print_counts(path: &Path, out: &mut dyn Write) -> Result<()> {
    let counts = count_ledger(path)?;
    for (name, count) in counts {
        writeln!(out, "{name} {count}")?;
    }
    Ok(())
}

pub fn clear(
    ledger: &NameLedger,
    directory: &Path,
    safe: bool,
    confirm: &mut dyn ConfirmRemoval,
    out: &mut dyn Write,
) -> Result<()> {
    let report = ledger.clear_signed_report(directory, safe, confirm);
    for path in &report.removed {
        writeln!(out, "removed {}", path.display())?;
    }
    for path in report.failed.iter().chain(&report.unreadable) {
        writeln!(out, "skipped {}", path.display())?;
    }
    Ok(())
}

pub fn classes(scene_path: &Path, out: &mut dyn Write) -> Result<()> {
    let scene = load_scene(scene_path)?;
    for class in all_classes(&scene) {
        writeln!(out, "{class}")?;
    }
    Ok(())
}

pub fn knobs(scene_path: &Path, class: &str, out: &mut dyn Write) -> Result<()> {
    let scene = load_scene(scene_path)?;
    for knob in all_class_knobs(&scene, class) {
        writeln!(out, "{knob}")?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CoerceFailure {
    code: ErrorCode,
    message: String,
}

/// Applies `value` to `knob` on every node of `class` and saves the
/// scene. The scene is saved even when the batch stops part way, since
/// nodes set before the failure keep their value.
#[allow(clippy::too_many_arguments)]
pub fn set(
    table: &CoercionTable,
    scene_path: &Path,
    class: &str,
    knob: &str,
    value: &str,
    output: Option<&Path>,
    json: bool,
    out: &mut dyn Write,
) -> Result<ApplyReport> {
    let scene = load_scene(scene_path)?;
    if !all_classes(&scene).iter().any(|c| c == class)
        || !all_class_knobs(&scene, class).iter().any(|k| k == knob)
    {
        bail!("Please select valid class and knob!");
    }

    let result = apply_value_to_class(&scene, table, class, knob, value);
    if let Err(err) = &result {
        warn!(error = %err, "saving scene with a partially applied batch");
    }

    let destination = output.unwrap_or(scene_path);
    scene
        .save(destination)
        .with_context(|| format!("failed to save scene '{}'", destination.display()))?;

    let report = result?;
    if json {
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else {
        for node in &report.updated {
            writeln!(out, "{node}.{knob}")?;
        }
    }
    Ok(report)
}

pub fn coerce(
    table: &CoercionTable,
    kind: &str,
    arity: usize,
    value: &str,
    scene_path: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let scene = match scene_path {
        Some(path) => load_scene(path)?,
        None => Scene::default(),
    };
    let kind = KnobKind::from(kind.to_string());
    match table.coerce_value(value, &kind, arity, &scene) {
        Ok(coerced) => {
            writeln!(out, "{}", serde_json::to_string(&coerced)?)?;
            Ok(())
        }
        Err(err) => {
            let failure = CoerceFailure {
                code: err.code(),
                message: err.to_string(),
            };
            writeln!(out, "{}", serde_json::to_string(&failure)?)?;
            Err(err.into())
        }
    }
}

pub fn show_config(settings: &Settings, out: &mut dyn Write) -> Result<()> {
    write!(out, "{}", toml::to_string_pretty(settings)?)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
