use std::path::{Path, PathBuf};

use anyhow::Context;
use ::config::{Config, Environment, File};
use ledger::DEFAULT_SIGNATURE;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "knobtool.toml";
pub const ENV_PREFIX: &str = "KNOBTOOL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub ledger_dir: PathBuf,
    pub signature: String,
    pub recursive: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_dir: PathBuf::from("./knob-ledgers"),
            signature: DEFAULT_SIGNATURE.into(),
            recursive: false,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `knobtool.toml` (or `path`), then `KNOBTOOL__*` variables.
/// An explicitly named file must exist; the default one is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let environment = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true);
    build_settings(path, environment)
}

fn build_settings(path: Option<&Path>, environment: Environment) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let config = Config::builder()
        .set_default("ledger_dir", defaults.ledger_dir.to_string_lossy().into_owned())?
        .set_default("signature", defaults.signature)?
        .set_default("recursive", defaults.recursive)?
        .set_default("log_filter", defaults.log_filter)?
        .add_source(File::from(file.clone()).required(required))
        .add_source(environment)
        .build()
        .with_context(|| format!("failed to load settings from '{}'", file.display()))?;

    config
        .try_deserialize()
        .context("settings have the wrong shape")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
