//! Append-only activity log.
//!
//! One JSON entry per line, appended and synced before the mutation is
//! acknowledged. The log is never rewritten or compacted; retention is an
//! external concern.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::roster::{ActivityEntry, Shift};

use super::errors::{StoreError, StoreResult};

/// Append-only activity log backed by a JSONL file.
pub struct ActivityLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ActivityLog {
    /// Opens (or creates) `activity.log` in the data directory.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let path = dir.join("activity.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Appends one entry and syncs it to disk.
    pub fn append(&self, entry: &ActivityEntry) -> StoreResult<()> {
        let mut line = serde_json::to_vec(entry)
            .map_err(|e| StoreError::malformed(&self.path, e.to_string()))?;
        line.push(b'\n');

        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&line)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.sync_data().map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    /// Returns the most recent entries, newest first, optionally filtered
    /// by shift. Unparseable lines are skipped rather than failing the read;
    /// a half-written tail line must not take the whole feed down.
    pub fn recent(&self, shift: Option<Shift>, limit: usize) -> StoreResult<Vec<ActivityEntry>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let mut entries: Vec<ActivityEntry> = contents
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .filter(|entry: &ActivityEntry| match shift {
                Some(s) => entry.shift == Some(s),
                None => true,
            })
            .collect();

        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }
}
