//! Append-only event log
//!
//! One JSON object per record, records separated by a single newline.
//! The separator is written before a record only when the sink already
//! holds content, so the file never starts with a blank line and never
//! ends with a dangling one. An internal lock keeps framing valid under
//! concurrent writers. Writes are best-effort for callers that use
//! [`EventLog::record`]; a failure is logged and absorbed.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

struct Sink {
    file: File,
    has_content: bool,
}

/// Shared append-only JSON-record sink
pub struct EventLog {
    path: PathBuf,
    sink: Mutex<Sink>,
}

impl EventLog {
    /// Open (or create) the log file in append mode
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let has_content = file.metadata().await?.len() > 0;
        Ok(Self {
            path,
            sink: Mutex::new(Sink { file, has_content }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, propagating I/O failures
    pub async fn append<T: Serialize>(&self, record: &T) -> io::Result<()> {
        let json = serde_json::to_vec(record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut sink = self.sink.lock().await;
        if sink.has_content {
            sink.file.write_all(b"\n").await?;
        }
        sink.file.write_all(&json).await?;
        sink.file.flush().await?;
        sink.has_content = true;
        Ok(())
    }

    /// Append one record, best-effort. Failures are logged, never returned.
    pub async fn record<T: Serialize>(&self, record: &T) {
        if let Err(e) = self.append(record).await {
            tracing::warn!(path = %self.path.display(), error = %e, "event log write failed");
        }
    }
}
