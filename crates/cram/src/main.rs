//! cram - timed, shuffled prompts from a plain text deck
//!
//! This is the entry point. It wires together:
//! - Settings loading
//! - Deck parsing
//! - The event log
//! - The Unix terminal
//! - The scheduler and runner

use anyhow::{Context, Result};
use clap::Parser;
use cram_config::{load_settings, load_settings_or_default, LogSettings, Settings};
use cram_core::{Rng, Runner};
use cram_deck::load_session;
use cram_log::{open_event_log, LogEvent};
use cram_term_unix::UnixTerminal;
use cram_util::{default_config_path, SystemClock};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// cram - timed, shuffled prompts from a text file
#[derive(Parser, Debug)]
#[command(name = "cram", version)]
#[command(about = "Shows timed, shuffled prompts from a text file, one at a time", long_about = None)]
#[command(after_help = "Keys: Enter/Space/alnum = next, Ctrl+C = quit")]
struct Args {
    /// Deck file: `[Name | seconds]` headers, each followed by prompt lines
    file: PathBuf,

    /// Settings file (default: ~/.config/cram/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event log path override (or set CRAM_LOG_FILE env var)
    #[arg(long, env = "CRAM_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Do not write the event log
    #[arg(long)]
    no_log: bool,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => return usage_exit(&e),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "cram starting");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Help and version are successes; any other parse failure is a usage error.
/// Failing to print the usage itself is reported with status 2.
fn usage_exit(e: &clap::Error) -> ExitCode {
    let printed = e.print().is_ok();
    match (e.use_stderr(), printed) {
        (false, true) => ExitCode::SUCCESS,
        (false, false) | (true, true) => ExitCode::from(1),
        (true, false) => ExitCode::from(2),
    }
}

fn load_config(args: &Args) -> Result<Settings> {
    match &args.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => {
            let path = default_config_path();
            load_settings_or_default(&path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        }
    }
}

/// Settings file values with command-line overrides applied
fn log_settings(args: &Args, settings: &Settings) -> LogSettings {
    let mut log = settings.log.clone();
    if let Some(path) = &args.log_file {
        log.path = path.clone();
    }
    if args.no_log {
        log.enabled = false;
    }
    log
}

fn run(args: &Args) -> Result<()> {
    let settings = load_config(args)?;

    let session = load_session(&args.file, &settings.limits)
        .with_context(|| format!("Failed to load deck {}", args.file.display()))?;

    info!(
        path = %args.file.display(),
        groups = session.group_count(),
        items = session.item_count(),
        "Deck loaded"
    );

    let mut log = open_event_log(&log_settings(args, &settings));
    log.append(LogEvent::SessionStarted)
        .context("Failed to write event log")?;
    log.append(LogEvent::FileLoaded {
        bytes: session.buffer().len(),
        digest: session.digest().to_hex().to_string(),
        path: args.file.clone(),
    })
    .context("Failed to write event log")?;

    let mut terminal = UnixTerminal::new().context("Failed to open terminal")?;
    let clock = SystemClock;
    let rng = Rng::from_entropy().with_retry_limit(settings.run.rng_retry_limit);

    let result = Runner::new(
        &session,
        rng,
        &mut terminal,
        log.as_mut(),
        &clock,
        settings.run,
    )
    .run();

    let ended = log.append(LogEvent::SessionEnded);
    let summary = result.context("Session aborted")?;
    ended.context("Failed to write event log")?;

    debug!(
        prompts = summary.prompts_shown,
        switches = summary.group_switches,
        "Session summary"
    );
    Ok(())
}
