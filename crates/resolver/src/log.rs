//! The per-decision audit log.
//!
//! One record per answered query, serialized through a mutex on the sink.
//! The log handle is constructed once and shared by reference; the sink is
//! injected so tests swap in an in-memory fake. A failed write is reported
//! through `tracing` and otherwise swallowed: logging never aborts an
//! authentication decision.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

/// Which query produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Credential,
    Segment,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential => f.write_str("CREDENTIAL"),
            Self::Segment => f.write_str("SEGMENT"),
        }
    }
}

/// Destination for decision records.
pub trait DecisionSink: Send + Sync {
    fn write_record(&self, line: &str) -> io::Result<()>;
}

/// Appends records to a file, one per line, under a mutex.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl DecisionSink for FileSink {
    fn write_record(&self, line: &str) -> io::Result<()> {
        // A poisoned lock still holds a usable file handle.
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{line}")
    }
}

/// Collects records in memory; the fake sink for tests.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DecisionSink for MemorySink {
    fn write_record(&self, line: &str) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
        Ok(())
    }
}

/// Discards everything.
pub struct NullSink;

impl DecisionSink for NullSink {
    fn write_record(&self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Process-wide decision log handle.
#[derive(Clone)]
pub struct DecisionLog {
    sink: Arc<dyn DecisionSink>,
}

impl DecisionLog {
    pub fn new(sink: Arc<dyn DecisionSink>) -> Self {
        Self { sink }
    }

    /// Record one decision. Never fails; sink errors are swallowed.
    pub fn record(&self, kind: DecisionKind, input: &str, granted: bool) {
        let line = format!(
            "{} {}:{} input={} granted={}",
            Utc::now().to_rfc3339(),
            kind,
            Uuid::now_v7(),
            input,
            granted,
        );
        if let Err(err) = self.sink.write_record(&line) {
            warn!(%err, "decision record dropped");
        }
    }
}
