//! Event log record types

use cram_util::{unix_timestamp, UnixTimestamp};
use std::fmt;
use std::path::PathBuf;

/// Things worth a line in the event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// Run started
    SessionStarted,

    /// Deck file accepted
    FileLoaded {
        bytes: usize,
        /// Hex BLAKE3 digest of the file contents
        digest: String,
        path: PathBuf,
    },

    /// Raw byte read from the terminal
    Key { key: u8 },

    /// Prompt drawn on screen
    PromptShown { group: usize, item: usize, len: usize },

    /// Moved to the next group after its timer expired
    GroupSwitched { group: usize },

    /// Group's timer ran out; switch is pending
    GroupExpired { group: usize },

    /// Group order exhausted and drawn again
    GroupsReshuffled,

    /// Item order of a group exhausted and drawn again
    ItemsReshuffled { group: usize },

    WaitLoopExceeded,

    DisplayLoopExceeded,

    /// Run ended
    SessionEnded,
}

impl LogEvent {
    /// Bracketed tag that starts the record
    pub fn tag(&self) -> &'static str {
        match self {
            LogEvent::SessionStarted => "start",
            LogEvent::FileLoaded { .. } => "file",
            LogEvent::Key { .. } => "key",
            LogEvent::PromptShown { .. } => "prompt",
            LogEvent::GroupSwitched { .. } | LogEvent::GroupExpired { .. } => "group",
            LogEvent::GroupsReshuffled | LogEvent::ItemsReshuffled { .. } => "shuffle",
            LogEvent::WaitLoopExceeded | LogEvent::DisplayLoopExceeded => "error",
            LogEvent::SessionEnded => "exit",
        }
    }
}

impl fmt::Display for LogEvent {
    /// The record's message, without timestamp or tag
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::SessionStarted => write!(f, "session started"),
            LogEvent::FileLoaded {
                bytes,
                digest,
                path,
            } => write!(f, "bytes={} blake3={} path={}", bytes, digest, path.display()),
            LogEvent::Key { key } => write!(f, "key={}", key),
            LogEvent::PromptShown { group, item, len } => {
                write!(f, "group={} item={} len={}", group, item, len)
            }
            LogEvent::GroupSwitched { group } => write!(f, "switch group={}", group),
            LogEvent::GroupExpired { group } => write!(f, "expired group={}", group),
            LogEvent::GroupsReshuffled => write!(f, "groups"),
            LogEvent::ItemsReshuffled { group } => write!(f, "items group={}", group),
            LogEvent::WaitLoopExceeded => write!(f, "wait loop exceeded"),
            LogEvent::DisplayLoopExceeded => write!(f, "display loop exceeded"),
            LogEvent::SessionEnded => write!(f, "session end"),
        }
    }
}

/// A timestamped event, formatted as one log line (without the newline)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: UnixTimestamp,
    pub event: LogEvent,
}

impl LogRecord {
    pub fn new(event: LogEvent) -> Self {
        Self {
            timestamp: unix_timestamp(),
            event,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.timestamp, self.event.tag(), self.event)
    }
}
