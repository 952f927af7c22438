use std::{collections::BTreeMap, fs, path::Path};

use ledger::{count_ledger, NameLedger};
use shared::error::KnobError;

fn expected_counts(names: &[&str]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in names.iter().filter(|n| !n.is_empty()) {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn write_then_count_reproduces_counts_in_any_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let names = ["size", "mix", "", "size", "channels", "mix", "size"];
    let mut reversed = names;
    reversed.reverse();

    let first = ledger.write(names, dir.path(), None).expect("first");
    let second = ledger.write(reversed, dir.path(), None).expect("second");

    assert_eq!(count_ledger(&first).expect("count"), expected_counts(&names));
    assert_eq!(count_ledger(&second).expect("count"), expected_counts(&names));
    assert_eq!(
        fs::read_to_string(&first).expect("read"),
        fs::read_to_string(&second).expect("read")
    );
}

#[test]
fn same_basename_twice_never_collides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let first_names = ["mix", "mix", "size"];
    let second_names = ["channels"];

    let first = ledger
        .write(first_names, dir.path(), Some("scanline-count.mov"))
        .expect("first");
    let second = ledger
        .write(second_names, dir.path(), Some("scanline-count.mov"))
        .expect("second");

    assert_ne!(first, second);
    assert_eq!(first.file_name().unwrap(), "scanline-count.txt");
    assert_eq!(second.file_name().unwrap(), "scanline-count1.txt");
    assert_eq!(
        count_ledger(&first).expect("count"),
        expected_counts(&first_names)
    );
    assert_eq!(
        count_ledger(&second).expect("count"),
        expected_counts(&second_names)
    );
}

#[test]
fn clear_only_removes_signed_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let signed = ledger.write(["mix"], dir.path(), Some("a")).expect("write");
    let foreign = dir.path().join("notes.txt");
    fs::write(&foreign, "shopping list\nmix").expect("seed");
    let other_ext = dir.path().join("b.log");
    fs::write(&other_ext, "<scanline-test>\nmix").expect("seed");

    let mut never_asked = |_: &Path| -> bool { panic!("unsafe mode must not prompt") };
    assert!(ledger.clear_signed(dir.path(), false, &mut never_asked));

    assert!(!signed.exists());
    assert!(foreign.exists());
    assert!(other_ext.exists());
}

#[test]
fn safe_clear_keeps_declined_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let keep = ledger.write(["mix"], dir.path(), Some("keep")).expect("keep");
    let drop = ledger.write(["mix"], dir.path(), Some("drop")).expect("drop");
    let foreign = dir.path().join("notes.txt");
    fs::write(&foreign, "notes").expect("seed");

    let mut asked = Vec::new();
    let mut answer = |path: &Path| {
        asked.push(path.to_path_buf());
        path.file_name().is_some_and(|n| n == "drop.txt")
    };
    let report = ledger.clear_signed_report(dir.path(), true, &mut answer);

    assert_eq!(asked, vec![drop.clone(), keep.clone()]);
    assert_eq!(report.removed, vec![drop.clone()]);
    assert_eq!(report.retained, vec![keep.clone()]);
    assert_eq!(report.unsigned, vec![foreign.clone()]);
    assert!(keep.exists());
    assert!(!drop.exists());
    assert!(foreign.exists());
}

#[test]
fn clear_on_missing_directory_still_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();
    let mut yes = |_: &Path| true;
    assert!(ledger.clear_signed(&dir.path().join("missing"), true, &mut yes));
}

#[test]
fn count_of_missing_ledger_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = NameLedger::default()
        .count(&dir.path().join("gone.txt"))
        .expect_err("missing");
    assert!(matches!(err, KnobError::NotFound(_)));
}

#[test]
fn unreadable_file_is_skipped_without_stopping_the_sweep() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let garbled = dir.path().join("a-garbled.txt");
    fs::write(&garbled, [0xff, 0xfe, b'\n', 0xc3]).expect("seed");
    let signed = ledger.write(["mix"], dir.path(), Some("b")).expect("write");

    let mut yes = |_: &Path| true;
    let report = ledger.clear_signed_report(dir.path(), false, &mut yes);
    assert_eq!(report.unreadable, vec![garbled.clone()]);
    assert_eq!(report.removed, vec![signed.clone()]);
    assert!(garbled.exists());
    assert!(!signed.exists());

    let again = ledger.write(["mix"], dir.path(), Some("c")).expect("write");
    assert!(ledger.clear_signed(dir.path(), false, &mut yes));
    assert!(!again.exists());
    assert!(garbled.exists());
}
