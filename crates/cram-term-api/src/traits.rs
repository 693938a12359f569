//! Terminal trait

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors from terminal operations
#[derive(Debug, Error)]
pub enum TermError {
    #[error("Input is not a terminal")]
    NotATerminal,

    #[error("Failed to read terminal attributes: {0}")]
    GetAttributes(#[source] io::Error),

    #[error("Failed to set terminal attributes: {0}")]
    SetAttributes(#[source] io::Error),

    #[error("Failed to wait for input: {0}")]
    Poll(#[source] io::Error),

    #[error("Failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    #[error("Terminal input closed")]
    InputClosed,
}

pub type TermResult<T> = Result<T, TermError>;

/// How long [`Terminal::read_key`] may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    /// Block until a key arrives
    Indefinite,
    /// Give up after this long
    Within(Duration),
}

/// The terminal a session is played on.
///
/// Implementations own raw-mode state; `leave` must undo whatever `enter` did
/// and be safe to call when `enter` was never called or already undone.
pub trait Terminal {
    /// Switch to raw, unbuffered, non-echoing input and hide the cursor
    fn enter(&mut self) -> TermResult<()>;

    /// Restore the original settings, show the cursor and clear the screen
    fn leave(&mut self) -> TermResult<()>;

    /// Clear the screen and draw one prompt
    fn show_prompt(&mut self, text: &[u8]) -> TermResult<()>;

    /// Wait for one byte of input.
    ///
    /// `Ok(None)` means no key arrived: the wait timed out or was interrupted.
    fn read_key(&mut self, wait: KeyWait) -> TermResult<Option<u8>>;
}
