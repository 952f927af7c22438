use super::*;

use std::{collections::HashMap, fs};

fn environment(vars: &[(&str, &str)]) -> Environment {
    let source: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .source(Some(source))
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = build_settings(None, environment(&[])).expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.signature, "<scanline-test>");
}

#[test]
fn file_overrides_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("knobtool.toml");
    fs::write(&path, "ledger_dir = \"/tmp/ledgers\"\nrecursive = true\n").expect("write config");

    let settings = build_settings(Some(&path), environment(&[])).expect("settings");
    assert_eq!(settings.ledger_dir, PathBuf::from("/tmp/ledgers"));
    assert!(settings.recursive);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("knobtool.toml");
    fs::write(&path, "signature = \"#from-file\"\n").expect("write config");

    let settings = build_settings(
        Some(&path),
        environment(&[
            ("KNOBTOOL__SIGNATURE", "#from-env"),
            ("KNOBTOOL__LOG_FILTER", "debug"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.signature, "#from-env");
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    assert!(build_settings(Some(&missing), environment(&[])).is_err());
}
