//! Command-line behavior of the check-deck tool

use std::path::{Path, PathBuf};
use std::process::Command;

fn check_deck(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_check-deck"));
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn write_deck(dir: &Path) -> PathBuf {
    let path = dir.join("deck.txt");
    std::fs::write(&path, "[Verbs | 30]\nto run\n").unwrap();
    path
}

#[test]
fn test_valid_deck() {
    let dir = tempfile::tempdir().unwrap();
    let deck = write_deck(dir.path());

    let output = check_deck(dir.path()).arg(&deck).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Groups: 1"), "{}", stdout);
}

#[test]
fn test_argument_count_must_be_one() {
    let dir = tempfile::tempdir().unwrap();
    let deck = write_deck(dir.path());

    let output = check_deck(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = check_deck(dir.path())
        .arg(&deck)
        .arg("extra.txt")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: check-deck"));
}

#[test]
fn test_invalid_deck() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("bad.txt");
    std::fs::write(&deck, "[A|5]\none\n[B|5] \ntwo\n").unwrap();

    let output = check_deck(dir.path()).arg(&deck).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Line 3: malformed header"));
}
