//! Terminal interface for cram
//!
//! This crate defines the capability the scheduler needs from a terminal:
//! raw mode on and off, drawing one prompt, and waiting a bounded time for a
//! key. It contains no platform code itself; see `cram-term-unix`.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
