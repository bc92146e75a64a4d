//! Checksummed, atomically-replaced table snapshots.
//!
//! Each table lives in one JSON file prefixed by a CRC32 line:
//!
//! ```text
//! crc32:9a8b7c6d
//! { ...json body... }
//! ```
//!
//! Writes go to a temp file, are fsynced, then renamed over the live file,
//! and the parent directory is fsynced, so a reader sees either the old
//! snapshot or the new one, never a torn write. The checksum covers the
//! entire JSON body and is verified on every read.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crc32fast::Hasher;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{StoreError, StoreResult};

/// Computes a CRC32 checksum over the provided bytes.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a checksum header line: `crc32:XXXXXXXX` (lowercase hex).
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parses a checksum header line back to a u32.
pub fn parse_checksum(line: &str) -> Option<u32> {
    let stripped = line.trim_end().strip_prefix("crc32:")?;
    u32::from_str_radix(stripped, 16).ok()
}

/// Serializes `value` and atomically replaces the snapshot at `path`.
pub fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let body = serde_json::to_vec_pretty(value)
        .map_err(|e| StoreError::malformed(path, e.to_string()))?;

    let mut contents = format_checksum(compute_checksum(&body)).into_bytes();
    contents.push(b'\n');
    contents.extend_from_slice(&body);

    let tmp_path = path.with_extension("tmp");
    {
        let mut tmp = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tmp.write_all(&contents)
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tmp.sync_all().map_err(|e| StoreError::io(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e))?;
    sync_parent_dir(path)?;
    Ok(())
}

/// Reads and verifies the snapshot at `path`.
///
/// Returns `Ok(None)` when the file does not exist yet. A checksum mismatch
/// is an explicit `Corrupt` failure, not an empty result.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let contents = match fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let newline = contents
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| StoreError::malformed(path, "missing checksum header"))?;

    let header = std::str::from_utf8(&contents[..newline])
        .map_err(|_| StoreError::malformed(path, "non-UTF8 checksum header"))?;
    let expected = parse_checksum(header)
        .ok_or_else(|| StoreError::malformed(path, "unparseable checksum header"))?;

    let body = &contents[newline + 1..];
    if compute_checksum(body) != expected {
        return Err(StoreError::corrupt(path));
    }

    let value = serde_json::from_slice(body)
        .map_err(|e| StoreError::malformed(path, e.to_string()))?;
    Ok(Some(value))
}

fn sync_parent_dir(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        // Directory fsync is best-effort on platforms that refuse to open
        // directories for writing.
        if let Ok(dir) = File::open(parent) {
            dir.sync_all().map_err(|e| StoreError::io(parent, e))?;
        }
    }
    Ok(())
}
