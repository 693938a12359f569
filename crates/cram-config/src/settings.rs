//! Validated settings structures

use crate::schema::{RawLimits, RawLog, RawRun, RawSettings};
use cram_util::default_log_path;
use std::path::PathBuf;

/// Hard ceiling on the number of groups in one deck
pub const MAX_GROUPS: usize = 65_536;
/// Hard ceiling on the number of prompts in one deck
pub const MAX_ITEMS_TOTAL: usize = 1_048_576;
/// Hard ceiling on the number of prompts in one group
pub const MAX_ITEMS_PER_GROUP: usize = 65_536;
/// Hard ceiling on one line's length in bytes, excluding EOL
pub const MAX_LINE_LEN: usize = 65_536;
/// Hard ceiling on the deck file size
pub const MAX_FILE_BYTES: usize = 16 * 1024 * 1024;
/// Hard ceiling on a group's duration (one day)
pub const MAX_GROUP_SECONDS: u32 = 86_400;
/// Hard ceiling on key waits per displayed prompt
pub const MAX_WAIT_LOOPS: usize = 1_048_576;
/// Hard ceiling on prompts per run
pub const MAX_PROMPTS_PER_RUN: usize = 1_048_576;
/// Hard ceiling on rejection-sampling attempts
pub const RNG_RETRY_LIMIT: u32 = 64;

/// Validated settings ready for use by the parser, scheduler and logger
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub limits: DeckLimits,
    pub run: RunLimits,
    pub log: LogSettings,
}

impl Settings {
    /// Convert from raw settings (after validation)
    pub fn from_raw(raw: RawSettings) -> Self {
        Self {
            limits: DeckLimits::from_raw(&raw.limits),
            run: RunLimits::from_raw(&raw.run),
            log: LogSettings::from_raw(raw.log),
        }
    }
}

/// Capacities enforced while parsing a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckLimits {
    pub max_groups: usize,
    pub max_items_total: usize,
    pub max_items_per_group: usize,
    pub max_line_len: usize,
    pub max_file_bytes: usize,
    pub max_group_seconds: u32,
}

impl DeckLimits {
    fn from_raw(raw: &RawLimits) -> Self {
        let defaults = Self::default();
        Self {
            max_groups: raw.max_groups.unwrap_or(defaults.max_groups),
            max_items_total: raw.max_items_total.unwrap_or(defaults.max_items_total),
            max_items_per_group: raw
                .max_items_per_group
                .unwrap_or(defaults.max_items_per_group),
            max_line_len: raw.max_line_len.unwrap_or(defaults.max_line_len),
            max_file_bytes: raw.max_file_bytes.unwrap_or(defaults.max_file_bytes),
            max_group_seconds: raw
                .max_group_seconds
                .unwrap_or(defaults.max_group_seconds),
        }
    }
}

impl Default for DeckLimits {
    fn default() -> Self {
        Self {
            max_groups: MAX_GROUPS,
            max_items_total: MAX_ITEMS_TOTAL,
            max_items_per_group: MAX_ITEMS_PER_GROUP,
            max_line_len: MAX_LINE_LEN,
            max_file_bytes: MAX_FILE_BYTES,
            max_group_seconds: MAX_GROUP_SECONDS,
        }
    }
}

/// Ceilings on the scheduler's loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub max_wait_loops: usize,
    pub max_prompts_per_run: usize,
    pub rng_retry_limit: u32,
}

impl RunLimits {
    fn from_raw(raw: &RawRun) -> Self {
        let defaults = Self::default();
        Self {
            max_wait_loops: raw.max_wait_loops.unwrap_or(defaults.max_wait_loops),
            max_prompts_per_run: raw
                .max_prompts_per_run
                .unwrap_or(defaults.max_prompts_per_run),
            rng_retry_limit: raw.rng_retry_limit.unwrap_or(defaults.rng_retry_limit),
        }
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_wait_loops: MAX_WAIT_LOOPS,
            max_prompts_per_run: MAX_PROMPTS_PER_RUN,
            rng_retry_limit: RNG_RETRY_LIMIT,
        }
    }
}

/// Event log settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub path: PathBuf,
    pub enabled: bool,
}

impl LogSettings {
    fn from_raw(raw: RawLog) -> Self {
        Self {
            path: raw.path.unwrap_or_else(default_log_path),
            enabled: raw.enabled.unwrap_or(true),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            enabled: true,
        }
    }
}
