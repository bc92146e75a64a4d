//! Store error types.

use std::io;
use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use crate::roster::Shift;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the embedded store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Disk I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Checksum mismatch: the snapshot on disk does not match what was
    /// written. Never ignored, never silently repaired.
    #[error("Checksum mismatch in {path}")]
    Corrupt { path: String },

    /// The file exists but does not parse as a snapshot.
    #[error("Malformed snapshot {path}: {message}")]
    Malformed { path: String, message: String },

    /// Optimistic concurrency failure: another writer replaced the roster
    /// between read and write.
    #[error("Roster version conflict for shift {shift}: expected {expected}, found {found}")]
    VersionConflict {
        shift: Shift,
        expected: u64,
        found: u64,
    },

    /// Record not present in the table.
    #[error("Record not found: {0}")]
    NotFound(Uuid),
}

impl StoreError {
    /// I/O error tagged with the offending path.
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Corruption error for the given path.
    pub fn corrupt(path: &Path) -> Self {
        Self::Corrupt {
            path: path.display().to_string(),
        }
    }

    /// Malformed-snapshot error for the given path.
    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}
