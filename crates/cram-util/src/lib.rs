//! Shared utilities for cram
//!
//! This crate provides:
//! - Monotonic time for group deadlines
//! - A `Clock` seam with system and manually-driven implementations
//! - Wall-clock timestamps for event log records
//! - Default paths for the settings file and event log

mod paths;
mod time;

pub use paths::*;
pub use time::*;
