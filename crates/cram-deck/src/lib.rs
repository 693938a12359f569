//! Deck loading for cram
//!
//! A deck file is read into one buffer, checked against [`DeckLimits`] and
//! parsed into a [`Session`]: an ordered list of timed groups, each owning a
//! contiguous run of prompts. Group names and prompts are spans into the
//! buffer, so prompt text is shown byte-for-byte as it appears in the file.

mod model;
mod parser;

pub use model::*;
pub use parser::parse_session;

use cram_config::DeckLimits;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What went wrong on a specific line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineErrorKind {
    #[error("malformed header")]
    MalformedHeader,

    #[error("invalid seconds value")]
    InvalidSeconds,

    #[error("item before any group header")]
    ItemBeforeHeader,

    #[error("previous group has no items")]
    PreviousGroupEmpty,

    #[error("too many groups")]
    TooManyGroups,

    #[error("too many items")]
    TooManyItems,

    #[error("too many items in group")]
    TooManyItemsInGroup,

    #[error("line too long")]
    LineTooLong,
}

/// Deck loading errors
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file exceeds maximum size of {max} bytes")]
    FileTooLarge { max: usize },

    #[error("Line {line}: {kind}")]
    Line { line: usize, kind: LineErrorKind },

    #[error("no groups found")]
    NoGroups,

    #[error("last group has no items")]
    LastGroupEmpty,
}

impl DeckError {
    /// 1-based line the error was found on, if it is tied to one
    pub fn line(&self) -> Option<usize> {
        match self {
            DeckError::Line { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type DeckResult<T> = Result<T, DeckError>;

/// Read and parse a deck file.
///
/// At most `max_file_bytes + 1` bytes are read, so an oversized file is
/// rejected without pulling all of it into memory.
pub fn load_session(path: impl AsRef<Path>, limits: &DeckLimits) -> DeckResult<Session> {
    let path = path.as_ref();
    let read_error = |source| DeckError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let cap = u64::try_from(limits.max_file_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);

    let mut buffer = Vec::new();
    file.take(cap).read_to_end(&mut buffer).map_err(read_error)?;

    if buffer.len() > limits.max_file_bytes {
        return Err(DeckError::FileTooLarge {
            max: limits.max_file_bytes,
        });
    }

    parse_session(buffer, limits)
}
