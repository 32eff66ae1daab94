//! Progress log
//!
//! Every cycle writes an ordered, human readable trail of what it did:
//! start, each deletion attempt and its outcome, each sweep removal, finish.
//! [LogFileSink] appends it to a per-process file under the log directory;
//! each event is mirrored to [tracing] as well.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

/// One line of the progress log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    ServiceStarted,
    CycleStarted,
    Deleting { path: PathBuf },
    DeleteFailed { path: PathBuf, reason: String },
    Swept { path: PathBuf },
    SweepFailed { path: PathBuf, reason: String },
    CycleFinished { deleted: usize, failed: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::ServiceStarted => write!(f, "Started task"),
            ProgressEvent::CycleStarted => write!(f, "Starting run"),
            ProgressEvent::Deleting { path } => write!(f, "Deleting: {}", path.display()),
            ProgressEvent::DeleteFailed { path, reason } => write!(
                f,
                "Error deleting {} ({reason}). Check if it still exists.",
                path.display()
            ),
            ProgressEvent::Swept { path } => write!(f, "Swept: {}", path.display()),
            ProgressEvent::SweepFailed { path, reason } => {
                write!(f, "Error sweeping {} ({reason})", path.display())
            }
            ProgressEvent::CycleFinished { deleted, failed } => {
                write!(f, "Finished run ({deleted} deleted, {failed} failed)")
            }
        }
    }
}

/// Destination for progress events. Recording never fails the caller.
pub trait ProgressSink: Send + Sync {
    fn record(&self, event: ProgressEvent);
}

/// Appends timestamped lines to `<dir>/<unix millis>.txt`
#[derive(Debug)]
pub struct LogFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFileSink {
    /// Create the log directory if needed and open a new log file in it
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.txt", Utc::now().timestamp_millis()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressSink for LogFileSink {
    fn record(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::DeleteFailed { .. } | ProgressEvent::SweepFailed { .. } => {
                warn!(target: "plexsweep::progress", "{event}")
            }
            _ => info!(target: "plexsweep::progress", "{event}"),
        }

        let line = format!(
            "{} {event}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let mut file = self.file.lock();
        if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write progress log");
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }
}

impl ProgressSink for MemorySink {
    fn record(&self, event: ProgressEvent) {
        self.events.lock().push(event);
    }
}
