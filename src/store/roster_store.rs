//! Versioned per-shift roster snapshots.
//!
//! Each shift's roster (active and inactive members together) is one
//! snapshot file carrying a monotonically increasing version stamp. The
//! whole re-densified position list is replaced in a single atomic write, so
//! `order_position` can never be observed with duplicates or gaps, and a
//! stale writer is rejected with `VersionConflict` instead of clobbering a
//! concurrent update.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::{Firefighter, Shift};

use super::errors::{StoreError, StoreResult};
use super::snapshot::{read_snapshot, write_snapshot};

/// One shift's persisted roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Bumped by one on every successful replace.
    pub version: u64,
    pub members: Vec<Firefighter>,
}

impl RosterSnapshot {
    /// The empty roster a shift starts with.
    pub fn empty() -> Self {
        Self {
            version: 0,
            members: Vec::new(),
        }
    }
}

/// Store for the three per-shift roster files.
pub struct RosterStore {
    dir: PathBuf,
}

impl RosterStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, shift: Shift) -> PathBuf {
        self.dir
            .join(format!("roster_{}.json", shift.as_str().to_lowercase()))
    }

    /// Loads a shift's roster. A missing file is the empty roster.
    pub fn load(&self, shift: Shift) -> StoreResult<RosterSnapshot> {
        Ok(read_snapshot(&self.path_for(shift))?.unwrap_or_else(RosterSnapshot::empty))
    }

    /// Replaces a shift's entire roster in one atomic write.
    ///
    /// `expected_version` must match the version currently on disk; on
    /// mismatch nothing is written and `VersionConflict` is returned so the
    /// caller can reload and retry.
    pub fn replace(
        &self,
        shift: Shift,
        expected_version: u64,
        members: Vec<Firefighter>,
    ) -> StoreResult<u64> {
        let current = self.load(shift)?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                shift,
                expected: expected_version,
                found: current.version,
            });
        }

        let next = RosterSnapshot {
            version: expected_version + 1,
            members,
        };
        write_snapshot(&self.path_for(shift), &next)?;
        Ok(next.version)
    }

    /// Finds a member by id across all shifts.
    pub fn find(&self, id: Uuid) -> StoreResult<Option<Firefighter>> {
        for shift in Shift::ALL {
            let snapshot = self.load(shift)?;
            if let Some(ff) = snapshot.members.into_iter().find(|ff| ff.id == id) {
                return Ok(Some(ff));
            }
        }
        Ok(None)
    }

    /// Writes the initial empty snapshot for every shift.
    pub fn init(&self) -> StoreResult<()> {
        for shift in Shift::ALL {
            let path = self.path_for(shift);
            if read_snapshot::<RosterSnapshot>(&path)?.is_none() {
                write_snapshot(&path, &RosterSnapshot::empty())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn member(name: &str, shift: Shift, position: u32) -> Firefighter {
        Firefighter::new(name, shift, position)
    }

    #[test]
    fn test_missing_file_is_empty_roster() {
        let dir = TempDir::new().unwrap();
        let store = RosterStore::new(dir.path());

        let snapshot = store.load(Shift::A).unwrap();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.members.is_empty());
    }

    #[test]
    fn test_replace_bumps_version() {
        let dir = TempDir::new().unwrap();
        let store = RosterStore::new(dir.path());

        let v1 = store
            .replace(Shift::B, 0, vec![member("One", Shift::B, 0)])
            .unwrap();
        assert_eq!(v1, 1);

        let snapshot = store.load(Shift::B).unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.members.len(), 1);
    }

    #[test]
    fn test_stale_writer_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = RosterStore::new(dir.path());

        store.replace(Shift::A, 0, vec![]).unwrap();

        let err = store
            .replace(Shift::A, 0, vec![member("Late", Shift::A, 0)])
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                expected: 0,
                found: 1,
                ..
            }
        ));

        // The rejected write left nothing behind.
        assert!(store.load(Shift::A).unwrap().members.is_empty());
    }

    #[test]
    fn test_find_scans_all_shifts() {
        let dir = TempDir::new().unwrap();
        let store = RosterStore::new(dir.path());

        let wanted = member("Sato", Shift::C, 0);
        store.replace(Shift::C, 0, vec![wanted.clone()]).unwrap();

        let found = store.find(wanted.id).unwrap().unwrap();
        assert_eq!(found.name, "Sato");
        assert!(store.find(Uuid::new_v4()).unwrap().is_none());
    }
}
