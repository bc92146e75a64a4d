//! # Embedded Store
//!
//! Persistence for rosters, holds, and the activity log, backed by plain
//! files in one data directory:
//!
//! - `roster_a.json` / `roster_b.json` / `roster_c.json`: versioned,
//!   checksummed shift rosters, replaced atomically as a whole
//! - `holds.json`: scheduled-hold records
//! - `activity.log`: append-only JSONL audit trail
//!
//! Snapshot writes are temp-file + fsync + rename, so a crash mid-write
//! leaves the previous snapshot intact. Roster replaces carry an optimistic
//! version stamp; see [`roster_store::RosterStore::replace`].

pub mod activity_log;
pub mod errors;
pub mod hold_store;
pub mod roster_store;
pub mod snapshot;

use std::fs;
use std::path::Path;

pub use activity_log::ActivityLog;
pub use errors::{StoreError, StoreResult};
pub use hold_store::{HoldQuery, HoldStore};
pub use roster_store::{RosterSnapshot, RosterStore};

/// Facade owning the three tables of one data directory.
pub struct Store {
    roster: RosterStore,
    holds: HoldStore,
    activity: ActivityLog,
}

impl Store {
    /// Opens an existing data directory, creating it if needed.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::io(data_dir, e))?;
        Ok(Self {
            roster: RosterStore::new(data_dir),
            holds: HoldStore::new(data_dir),
            activity: ActivityLog::open(data_dir)?,
        })
    }

    /// Initializes a fresh data directory with empty tables.
    pub fn init(data_dir: &Path) -> StoreResult<Self> {
        let store = Self::open(data_dir)?;
        store.roster.init()?;
        Ok(store)
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn holds(&self) -> &HoldStore {
        &self.holds
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }
}
