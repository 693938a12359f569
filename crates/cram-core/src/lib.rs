//! Shuffle engine and scheduling state machine for cram
//!
//! This crate contains:
//! - A seeded xorshift64* generator with unbiased range sampling and shuffling
//! - The group/prompt scheduler (pure; time is passed in)
//! - The runner that plays scheduler events on a terminal and event log
//! - Liveness ceilings on both the key-wait and prompt loops

mod events;
mod rng;
mod runner;
mod scheduler;

pub use events::*;
pub use rng::*;
pub use runner::*;
pub use scheduler::*;

use cram_log::LogError;
use cram_term_api::TermError;
use thiserror::Error;

/// Errors that end a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] TermError),

    #[error("Event log error: {0}")]
    Log(#[from] LogError),

    #[error("wait loop exceeded ({0} iterations without an advance key)")]
    WaitLoopExhausted(usize),

    #[error("display loop exceeded ({0} prompts)")]
    DisplayLoopExhausted(usize),
}

pub type RunResult<T> = Result<T, RunError>;
