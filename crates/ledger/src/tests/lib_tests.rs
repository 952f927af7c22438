use super::*;

use std::collections::HashSet;

fn taken_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

#[test]
fn free_name_is_returned_unchanged() {
    let taken = taken_set(&[]);
    assert_eq!(
        next_free_name("scanline-count", |c| taken.contains(c)).as_deref(),
        Some("scanline-count.txt")
    );
}

#[test]
fn foreign_extension_is_replaced_with_txt() {
    let taken = taken_set(&[]);
    assert_eq!(
        next_free_name("scanline-count.mov", |c| taken.contains(c)).as_deref(),
        Some("scanline-count.txt")
    );
}

#[test]
fn collision_appends_counter() {
    let taken = taken_set(&["knobs.txt"]);
    assert_eq!(
        next_free_name("knobs", |c| taken.contains(c)).as_deref(),
        Some("knobs1.txt")
    );
}

#[test]
fn collision_increments_existing_counter() {
    let taken = taken_set(&["take9.txt", "take10.txt"]);
    assert_eq!(
        next_free_name("take9.txt", |c| taken.contains(c)).as_deref(),
        Some("take11.txt")
    );
}

#[test]
fn all_digit_stem_keeps_counting() {
    let taken = taken_set(&["7.txt"]);
    assert_eq!(
        next_free_name("7", |c| taken.contains(c)).as_deref(),
        Some("8.txt")
    );
}

#[test]
fn basename_without_file_name_has_no_candidate() {
    assert_eq!(next_free_name("/", |_| false), None);
    assert_eq!(next_free_name("a/..", |_| false), None);
    assert_eq!(
        next_free_name("shots/knobs.mov", |_| false).as_deref(),
        Some("knobs.txt")
    );
}

#[test]
fn write_rejects_basenames_outside_the_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("ledgers");
    let ledger = NameLedger::default();

    for basename in ["/", "a/.."] {
        let err = ledger
            .write(["mix"], &target, Some(basename))
            .expect_err("no file name to write");
        assert!(matches!(err, KnobError::InvalidInput(_)), "{basename}: {err}");
    }

    let written: Vec<_> = fs::read_dir(dir.path())
        .expect("list")
        .chain(fs::read_dir(&target).expect("list target"))
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .collect();
    assert!(written.is_empty());
}

#[test]
fn split_handles_missing_and_oversized_numbers() {
    assert_eq!(split_trailing_number("knobs"), ("knobs", 0));
    assert_eq!(split_trailing_number("knobs09"), ("knobs", 9));
    assert_eq!(
        split_trailing_number("n99999999999999999999999"),
        ("n99999999999999999999999", 0)
    );
}

#[test]
fn collision_check_is_case_insensitive() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("Knobs.TXT"), "x").expect("seed");

    let resolved = resolve_basename(dir.path(), "knobs").expect("resolve");
    assert_eq!(resolved, "knobs1.txt");
}

#[test]
fn resolving_in_missing_directory_is_free() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("not-yet");
    assert_eq!(
        resolve_basename(&missing, "knobs").expect("resolve"),
        "knobs.txt"
    );
}

#[test]
fn write_sorts_names_under_signature() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let path = ledger
        .write(["size", "", "mix", "channels"], dir.path(), Some("knobs"))
        .expect("write");

    let raw = fs::read_to_string(&path).expect("read");
    assert_eq!(raw, "<scanline-test>\nchannels\nmix\nsize");
    assert_eq!(path, dir.path().join("knobs.txt"));
}

#[test]
fn write_rejects_empty_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let err = ledger
        .write(Vec::<String>::new(), dir.path(), None)
        .expect_err("empty names");
    assert!(matches!(err, KnobError::InvalidInput(_)));

    let err = ledger
        .write(["", ""], dir.path(), None)
        .expect_err("only blanks");
    assert!(matches!(err, KnobError::InvalidInput(_)));
}

#[test]
fn write_without_basename_uses_random_txt_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let path = ledger.write(["mix"], dir.path(), None).expect("write");
    let name = path.file_name().expect("file name").to_string_lossy();
    assert!(name.ends_with(".txt"));
    assert!(Uuid::parse_str(name.trim_end_matches(".txt")).is_ok());
}

#[test]
fn write_creates_missing_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("a").join("b");
    let ledger = NameLedger::default();

    let path = ledger.write(["mix"], &nested, Some("k")).expect("write");
    assert!(path.exists());
}

#[test]
fn count_skips_first_line_and_is_case_sensitive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("manual.txt");
    fs::write(&path, "anything\nmix\nMix\nmix\n").expect("seed");

    let counts = count_ledger(&path).expect("count");
    assert_eq!(counts.get("mix"), Some(&2));
    assert_eq!(counts.get("Mix"), Some(&1));
    assert_eq!(counts.get("anything"), None);
}

#[test]
fn count_missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = count_ledger(&dir.path().join("nope.txt")).expect_err("missing");
    assert!(matches!(err, KnobError::NotFound(_)));
}

#[test]
fn is_signed_requires_exact_first_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::default();

    let signed = dir.path().join("signed.txt");
    fs::write(&signed, "<scanline-test>\r\nmix").expect("seed");
    let padded = dir.path().join("padded.txt");
    fs::write(&padded, " <scanline-test>\nmix").expect("seed");

    assert!(ledger.is_signed(&signed).expect("signed"));
    assert!(!ledger.is_signed(&padded).expect("padded"));
}

#[test]
fn custom_signature_is_honoured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = NameLedger::new("#knob-ledger");

    let path = ledger.write(["mix"], dir.path(), None).expect("write");
    assert!(ledger.is_signed(&path).expect("signed"));
    assert!(!NameLedger::default().is_signed(&path).expect("other"));
}
