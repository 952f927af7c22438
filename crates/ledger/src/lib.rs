//! Knob name ledgers: signed, sorted, one-name-per-line text files.
//!
//! The first line of every ledger is the signature token. Counting skips
//! it and cleanup only ever touches files that carry it.

use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use shared::error::{KnobError, KnobResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_SIGNATURE: &str = "<scanline-test>";
pub const LEDGER_EXTENSION: &str = "txt";

const MAX_CREATE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
pub struct NameLedger {
    signature: String,
}

impl Default for NameLedger {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE)
    }
}

/// Asked once per signed file when clearing in safe mode.
pub trait ConfirmRemoval {
    fn confirm(&mut self, path: &Path) -> bool;
}

impl<F> ConfirmRemoval for F
where
    F: FnMut(&Path) -> bool,
{
    fn confirm(&mut self, path: &Path) -> bool {
        self(path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub removed: Vec<PathBuf>,
    pub retained: Vec<PathBuf>,
    pub unsigned: Vec<PathBuf>,
    pub unreadable: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl NameLedger {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }

    /// Writes the non-empty `names`, sorted, under the signature line and
    /// returns the path of the new file. An explicit `basename` is bumped
    /// (`knobs.txt`, `knobs1.txt`, ...) until it names no existing entry;
    /// without one a random name is used.
    pub fn write<I, S>(
        &self,
        names: I,
        directory: &Path,
        basename: Option<&str>,
    ) -> KnobResult<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return Err(KnobError::InvalidInput("no names provided".into()));
        }
        names.sort();

        if let Err(err) = fs::create_dir_all(directory) {
            debug!(
                directory = %directory.display(),
                error = %err,
                "ledger directory not created"
            );
        }

        let mut contents = String::with_capacity(
            self.signature.len() + names.iter().map(|n| n.len() + 1).sum::<usize>(),
        );
        contents.push_str(&self.signature);
        for name in &names {
            contents.push('\n');
            contents.push_str(name);
        }

        let basename = basename.filter(|b| !b.trim().is_empty());
        for _ in 0..MAX_CREATE_ATTEMPTS {
            let file_name = match basename {
                Some(desired) => resolve_basename(directory, desired)?,
                None => format!("{}.{LEDGER_EXTENSION}", Uuid::new_v4()),
            };
            let path = directory.join(file_name);
            if path.parent() != Some(directory) {
                return Err(KnobError::InvalidInput(format!(
                    "ledger name '{}' escapes '{}'",
                    path.display(),
                    directory.display()
                )));
            }

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents.as_bytes())?;
                    info!(path = %path.display(), names = names.len(), "wrote knob ledger");
                    return Ok(path);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "ledger name taken while writing, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "could not find a free ledger name in '{}'",
                directory.display()
            ),
        )
        .into())
    }

    pub fn count(&self, path: &Path) -> KnobResult<BTreeMap<String, usize>> {
        count_ledger(path)
    }

    /// True when the first line of `path` is exactly the signature.
    pub fn is_signed(&self, path: &Path) -> io::Result<bool> {
        let mut first_line = String::new();
        BufReader::new(File::open(path)?).read_line(&mut first_line)?;
        Ok(first_line.trim_end_matches(['\r', '\n']) == self.signature)
    }

    /// Best-effort removal of signed ledgers directly inside `directory`.
    /// Per-file failures are logged and never abort the sweep.
    pub fn clear_signed(
        &self,
        directory: &Path,
        safe: bool,
        confirm: &mut dyn ConfirmRemoval,
    ) -> bool {
        let report = self.clear_signed_report(directory, safe, confirm);
        info!(
            directory = %directory.display(),
            removed = report.removed.len(),
            retained = report.retained.len(),
            failed = report.failed.len(),
            "cleared signed ledgers"
        );
        true
    }

    pub fn clear_signed_report(
        &self,
        directory: &Path,
        safe: bool,
        confirm: &mut dyn ConfirmRemoval,
    ) -> ClearReport {
        let mut report = ClearReport::default();

        for path in ledger_candidates(directory) {
            match self.is_signed(&path) {
                Ok(true) => {}
                Ok(false) => {
                    report.unsigned.push(path);
                    continue;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable file");
                    report.unreadable.push(path);
                    continue;
                }
            }

            if safe && !confirm.confirm(&path) {
                debug!(path = %path.display(), "removal declined");
                report.retained.push(path);
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed ledger");
                    report.removed.push(path);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove ledger");
                    report.failed.push(path);
                }
            }
        }

        report
    }
}

/// Tallies every line after the first by exact, case-sensitive match.
pub fn count_ledger(path: &Path) -> KnobResult<BTreeMap<String, usize>> {
    if !path.exists() {
        return Err(KnobError::NotFound(format!(
            "'{}' doesn't exist, please provide a valid path",
            path.display()
        )));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut counts = BTreeMap::new();
    for line in reader.lines().skip(1) {
        *counts.entry(line?).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Resolves `desired` against the current contents of `directory`.
/// A basename without a file name component (`/`, `a/..`) is rejected.
pub fn resolve_basename(directory: &Path, desired: &str) -> KnobResult<String> {
    let taken: HashSet<String> = match fs::read_dir(directory) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().to_lowercase())
            .collect(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => HashSet::new(),
        Err(err) => return Err(err.into()),
    };

    next_free_name(desired, |candidate| taken.contains(&candidate.to_lowercase())).ok_or_else(
        || KnobError::InvalidInput(format!("'{desired}' does not name a ledger file")),
    )
}

/// Normalizes `desired` to `<stem>.txt` and, while `taken` says the
/// candidate exists, bumps the trailing number of the stem. `None` when
/// `desired` has no file name to build on.
pub fn next_free_name(desired: &str, taken: impl Fn(&str) -> bool) -> Option<String> {
    let stem = ledger_stem(desired)?;
    let candidate = format!("{stem}.{LEDGER_EXTENSION}");
    if !taken(&candidate) {
        return Some(candidate);
    }

    let (prefix, mut counter) = split_trailing_number(&stem);
    loop {
        counter += 1;
        let candidate = format!("{prefix}{counter}.{LEDGER_EXTENSION}");
        if !taken(&candidate) {
            return Some(candidate);
        }
    }
}

fn ledger_stem(desired: &str) -> Option<String> {
    let file_name = Path::new(desired).file_name()?;
    let stem = Path::new(file_name).file_stem().unwrap_or(file_name);
    Some(stem.to_string_lossy().into_owned())
}

fn split_trailing_number(stem: &str) -> (&str, u64) {
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &stem[prefix.len()..];
    match digits.parse::<u64>() {
        Ok(n) if n < u64::MAX => (prefix, n),
        Ok(_) => (stem, 0),
        Err(_) if digits.is_empty() => (prefix, 0),
        Err(_) => (stem, 0),
    }
}

fn ledger_candidates(directory: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(directory = %directory.display(), error = %err, "cannot list ledger directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == LEDGER_EXTENSION)
        })
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
