//! Event log sinks

use cram_config::LogSettings;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{LogError, LogEvent, LogRecord, LogResult};

/// Append-only event log
pub trait EventLog {
    /// Stamp and append one event
    fn append(&mut self, event: LogEvent) -> LogResult<()>;
}

/// Log file opened in append mode, created if absent
#[derive(Debug)]
pub struct FileLog {
    file: File,
    path: PathBuf,
}

impl FileLog {
    pub fn open(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Event log opened");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventLog for FileLog {
    fn append(&mut self, event: LogEvent) -> LogResult<()> {
        // One write per record
        let line = format!("{}\n", LogRecord::new(event));
        self.file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Keeps records in memory, for tests
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Vec<LogRecord>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn events(&self) -> impl Iterator<Item = &LogEvent> + '_ {
        self.records.iter().map(|r| &r.event)
    }

    /// Records carrying the given tag
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a LogEvent> + 'a {
        self.events().filter(move |e| e.tag() == tag)
    }
}

impl EventLog for MemoryLog {
    fn append(&mut self, event: LogEvent) -> LogResult<()> {
        self.records.push(LogRecord::new(event));
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl EventLog for NullLog {
    fn append(&mut self, _event: LogEvent) -> LogResult<()> {
        Ok(())
    }
}

/// Open the configured event log.
///
/// A log that cannot be opened is not fatal: the failure is reported on
/// standard error and the run continues without logging.
pub fn open_event_log(settings: &LogSettings) -> Box<dyn EventLog> {
    if !settings.enabled {
        debug!("Event log disabled");
        return Box::new(NullLog);
    }

    match FileLog::open(&settings.path) {
        Ok(log) => Box::new(log),
        Err(e) => {
            warn!(error = %e, "Continuing without event log");
            eprintln!("Warning: {}; continuing without event log", e);
            Box::new(NullLog)
        }
    }
}
