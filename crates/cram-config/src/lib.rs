//! Settings parsing and validation for cram
//!
//! Supports an optional TOML settings file with:
//! - Versioned schema
//! - Deck capacity limits (groups, items, line length, file size, seconds)
//! - Scheduler loop ceilings
//! - Event log location
//! - Validation with clear error messages
//!
//! Every value has a built-in default, so running without a settings file is
//! the normal case.

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Settings errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.errors))]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate settings from a TOML file
pub fn load_settings(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Load settings, falling back to defaults when the file does not exist
pub fn load_settings_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_settings(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No settings file, using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse and validate settings from a TOML string
pub fn parse_settings(content: &str) -> ConfigResult<Settings> {
    let raw: RawSettings = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_settings(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}
