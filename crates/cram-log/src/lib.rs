//! Event log for cram
//!
//! Provides:
//! - Tagged event records (`<secs>.<millis> [<tag>] <message>`)
//! - The `EventLog` trait with file, in-memory and no-op sinks
//! - Non-fatal opening: a log that cannot be created disables logging

mod event;
mod sink;

pub use event::*;
pub use sink::*;

use std::path::PathBuf;
use thiserror::Error;

/// Event log errors
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to open log file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log record: {0}")]
    Write(#[from] std::io::Error),
}

pub type LogResult<T> = Result<T, LogError>;
