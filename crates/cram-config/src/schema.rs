//! Raw settings schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw settings as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    /// Settings schema version
    pub config_version: u32,

    /// Deck capacity limits
    #[serde(default)]
    pub limits: RawLimits,

    /// Scheduler loop ceilings
    #[serde(default)]
    pub run: RawRun,

    /// Event log settings
    #[serde(default)]
    pub log: RawLog,
}

/// Deck capacity limits. Unset values take the built-in ceiling.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawLimits {
    pub max_groups: Option<usize>,
    pub max_items_total: Option<usize>,
    pub max_items_per_group: Option<usize>,
    pub max_line_len: Option<usize>,
    pub max_file_bytes: Option<usize>,
    pub max_group_seconds: Option<u32>,
}

/// Scheduler loop ceilings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawRun {
    /// Key waits allowed per displayed prompt
    pub max_wait_loops: Option<usize>,

    /// Prompts displayed per run
    pub max_prompts_per_run: Option<usize>,

    /// Rejection-sampling attempts before falling back to modulo
    pub rng_retry_limit: Option<u32>,
}

/// Event log settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawLog {
    /// Log file path (default: cram.log in the working directory)
    pub path: Option<PathBuf>,

    /// Set to false to disable the event log
    pub enabled: Option<bool>,
}
