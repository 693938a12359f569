//! Integration tests for cram
//!
//! End-to-end sessions through the scripted terminal and a manual clock, plus
//! the binary's command-line behavior.

use cram_config::{parse_settings, DeckLimits, RunLimits};
use cram_core::{Rng, RunError, Runner};
use cram_deck::{load_session, DeckError, LineErrorKind, Session};
use cram_log::{EventLog, FileLog, LogEvent, MemoryLog};
use cram_term_api::{KeyWait, MockInput, MockTerminal};
use cram_util::ManualClock;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

const DECK: &str = "\
# Spanish drill
[Verbs | 30]
to run
to eat
to sleep

[Nouns | 20]
the house
the dog
the cat
";

fn write_deck(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("deck.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn load(content: &str) -> Session {
    let dir = tempfile::tempdir().unwrap();
    let path = write_deck(dir.path(), content);
    load_session(&path, &DeckLimits::default()).unwrap()
}

#[test]
fn test_full_session_with_group_switch() {
    let session = load(DECK);
    let clock = ManualClock::new();
    let mut terminal = MockTerminal::new(
        [
            MockInput::KeyAfter(Duration::from_secs(1), b' '),
            MockInput::KeyAfter(Duration::from_secs(1), b'\r'),
            // Runs out whichever group came first
            MockInput::Timeout,
            MockInput::Key(b'?'),
            MockInput::Key(b'n'),
            MockInput::Key(3),
        ],
        clock.clone(),
    );
    let mut log = MemoryLog::new();

    let summary = Runner::new(
        &session,
        Rng::from_seed(2024),
        &mut terminal,
        &mut log,
        &clock,
        RunLimits::default(),
    )
    .run()
    .unwrap();

    assert_eq!(summary.keys, 5);
    assert_eq!(summary.group_switches, 1);
    assert_eq!(summary.prompts_shown, 4);
    assert_eq!((terminal.enter_count(), terminal.leave_count()), (1, 1));

    // The first three prompts come from one group, the last from the other
    let group_of = |text: &[u8]| {
        let index = (0..session.item_count())
            .find(|&i| session.item_text(i) == Some(text))
            .unwrap();
        session
            .groups()
            .iter()
            .position(|g| g.item_range().contains(&index))
            .unwrap()
    };
    let groups: Vec<usize> = terminal.screens().iter().map(|s| group_of(s.as_slice())).collect();
    assert_eq!(groups[0], groups[1]);
    assert_eq!(groups[1], groups[2]);
    assert_ne!(groups[2], groups[3]);

    // The pending switch makes later waits indefinite until acknowledged
    assert_eq!(terminal.waits()[3], KeyWait::Indefinite);
    assert_eq!(terminal.waits()[4], KeyWait::Indefinite);

    let tags: Vec<&str> = log.events().map(LogEvent::tag).collect();
    assert_eq!(
        tags,
        vec![
            "prompt", "key", "prompt", "key", "prompt", "group", "key", "key", "group",
            "prompt", "key",
        ]
    );
}

#[test]
fn test_prompts_reproduce_source_lines() {
    let session = load(DECK);
    let clock = ManualClock::new();
    let mut keys = vec![b' '; 12];
    keys.push(3);
    let mut terminal = MockTerminal::with_keys(&keys, clock.clone());
    let mut log = MemoryLog::new();

    Runner::new(
        &session,
        Rng::from_seed(5),
        &mut terminal,
        &mut log,
        &clock,
        RunLimits::default(),
    )
    .run()
    .unwrap();

    let lines: Vec<&str> = DECK.lines().collect();
    for screen in terminal.screens() {
        let text = std::str::from_utf8(screen).unwrap();
        assert!(lines.contains(&text), "unexpected prompt {:?}", text);
    }

    for event in log.tagged("prompt") {
        let LogEvent::PromptShown { item, len, .. } = event else {
            panic!("unexpected {:?}", event);
        };
        assert_eq!(session.item_text(*item).unwrap().len(), *len);
    }
}

#[test]
fn test_file_log_records() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("cram.log");
    let session = load("[A|5]\nhello\n");

    let clock = ManualClock::new();
    let mut terminal = MockTerminal::with_keys(&[b'x', 3], clock.clone());
    let mut log = FileLog::open(&log_path).unwrap();
    log.append(LogEvent::SessionStarted).unwrap();

    Runner::new(
        &session,
        Rng::from_seed(1),
        &mut terminal,
        &mut log,
        &clock,
        RunLimits::default(),
    )
    .run()
    .unwrap();
    log.append(LogEvent::SessionEnded).unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let messages: Vec<&str> = content
        .lines()
        .map(|line| line.split_once(' ').unwrap().1)
        .collect();
    assert_eq!(
        messages,
        vec![
            "[start] session started",
            "[prompt] group=0 item=0 len=5",
            "[key] key=120",
            "[shuffle] items group=0",
            "[prompt] group=0 item=0 len=5",
            "[key] key=3",
            "[exit] session end",
        ]
    );
}

#[test]
fn test_settings_limits_applied() {
    let settings = parse_settings("config_version = 1\n[limits]\nmax_items_per_group = 2\n").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_deck(dir.path(), DECK);

    let err = load_session(&path, &settings.limits).unwrap_err();
    assert!(matches!(
        err,
        DeckError::Line {
            line: 5,
            kind: LineErrorKind::TooManyItemsInGroup
        }
    ));
}

#[test]
fn test_liveness_fault_is_logged() {
    let session = load(DECK);
    let clock = ManualClock::new();
    let mut terminal = MockTerminal::new([MockInput::Key(b'\t'); 16], clock.clone());
    let mut log = MemoryLog::new();

    let err = Runner::new(
        &session,
        Rng::from_seed(3),
        &mut terminal,
        &mut log,
        &clock,
        RunLimits {
            max_wait_loops: 10,
            ..Default::default()
        },
    )
    .run()
    .unwrap_err();

    assert!(matches!(err, RunError::WaitLoopExhausted(10)));
    assert_eq!(log.tagged("key").count(), 10);
    assert_eq!(log.events().last(), Some(&LogEvent::WaitLoopExceeded));
    assert_eq!(terminal.leave_count(), 1);
}

fn cram() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cram"));
    cmd.env_remove("CRAM_LOG_FILE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let output = cram().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ctrl+C = quit"));
}

#[test]
fn test_cli_usage_error() {
    let output = cram().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());

    let output = cram().args(["a.txt", "b.txt"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_deck(dir.path(), "[Bad]\nx\n");

    let output = cram()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("--no-log")
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "{}", stderr);
    assert!(stderr.contains("Line 1: malformed header"), "{}", stderr);
}

#[test]
fn test_cli_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let output = cram()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("--no-log")
        .arg(dir.path().join("absent.txt"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.txt"));
}

#[test]
fn test_cli_explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let deck = write_deck(dir.path(), DECK);

    let output = cram()
        .arg("--no-log")
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg(&deck)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.toml"));
}
