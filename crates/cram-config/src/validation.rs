//! Settings validation

use crate::schema::{RawLimits, RawLog, RawRun, RawSettings};
use crate::settings::{
    MAX_FILE_BYTES, MAX_GROUPS, MAX_GROUP_SECONDS, MAX_ITEMS_PER_GROUP, MAX_ITEMS_TOTAL,
    MAX_LINE_LEN, MAX_PROMPTS_PER_RUN, MAX_WAIT_LOOPS, RNG_RETRY_LIMIT,
};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{key}' must be at least 1")]
    Zero { key: &'static str },

    #[error("'{key}' = {value} exceeds the ceiling of {ceiling}")]
    AboveCeiling {
        key: &'static str,
        value: u64,
        ceiling: u64,
    },

    #[error("max_items_per_group ({per_group}) exceeds max_items_total ({total})")]
    PerGroupExceedsTotal { per_group: usize, total: usize },

    #[error("log path cannot be empty")]
    EmptyLogPath,
}

/// Validate raw settings
pub fn validate_settings(settings: &RawSettings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_limits(&settings.limits));
    errors.extend(validate_run(&settings.run));
    errors.extend(validate_log(&settings.log));

    errors
}

fn validate_limits(limits: &RawLimits) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_range(&mut errors, "max_groups", limits.max_groups, MAX_GROUPS);
    check_range(&mut errors, "max_items_total", limits.max_items_total, MAX_ITEMS_TOTAL);
    check_range(
        &mut errors,
        "max_items_per_group",
        limits.max_items_per_group,
        MAX_ITEMS_PER_GROUP,
    );
    check_range(&mut errors, "max_line_len", limits.max_line_len, MAX_LINE_LEN);
    check_range(&mut errors, "max_file_bytes", limits.max_file_bytes, MAX_FILE_BYTES);
    check_range(
        &mut errors,
        "max_group_seconds",
        limits.max_group_seconds,
        MAX_GROUP_SECONDS,
    );

    // Compare effective values so one explicit side is checked against the other's default
    let per_group = limits.max_items_per_group.unwrap_or(MAX_ITEMS_PER_GROUP);
    let total = limits.max_items_total.unwrap_or(MAX_ITEMS_TOTAL);
    if per_group > total && per_group > 0 && total > 0 {
        errors.push(ValidationError::PerGroupExceedsTotal { per_group, total });
    }

    errors
}

fn validate_run(run: &RawRun) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_range(&mut errors, "max_wait_loops", run.max_wait_loops, MAX_WAIT_LOOPS);
    check_range(
        &mut errors,
        "max_prompts_per_run",
        run.max_prompts_per_run,
        MAX_PROMPTS_PER_RUN,
    );
    check_range(&mut errors, "rng_retry_limit", run.rng_retry_limit, RNG_RETRY_LIMIT);

    errors
}

fn validate_log(log: &RawLog) -> Vec<ValidationError> {
    match &log.path {
        Some(path) if path.as_os_str().is_empty() => vec![ValidationError::EmptyLogPath],
        _ => Vec::new(),
    }
}

fn check_range<T>(errors: &mut Vec<ValidationError>, key: &'static str, value: Option<T>, ceiling: T)
where
    T: Copy + TryInto<u64>,
{
    let Some(value) = value else {
        return;
    };
    let value = value.try_into().unwrap_or(u64::MAX);
    let ceiling = ceiling.try_into().unwrap_or(u64::MAX);

    if value == 0 {
        errors.push(ValidationError::Zero { key });
    } else if value > ceiling {
        errors.push(ValidationError::AboveCeiling {
            key,
            value,
            ceiling,
        });
    }
}
