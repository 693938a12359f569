//! Default paths for cram
//!
//! - Settings: `$XDG_CONFIG_HOME/cram/config.toml` or `~/.config/cram/config.toml`
//! - Event log: `cram.log` in the working directory

use std::path::PathBuf;

/// Environment variable for overriding the event log path
pub const CRAM_LOG_FILE_ENV: &str = "CRAM_LOG_FILE";

/// Event log filename, relative to the working directory
pub const DEFAULT_LOG_FILENAME: &str = "cram.log";

/// Settings filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "cram";

/// Get the default settings file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/cram/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/cram/config.toml`
/// 3. `./cram.toml` (no home directory)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from(format!("{}.toml", APP_DIR))
}

/// Get the default event log path.
pub fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILENAME)
}
