//! Scheduled-hold records.
//!
//! Holds live in a single snapshot file. Mutations are read-modify-write
//! under an internal mutex: hold traffic is light (a handful of records per
//! day per shift), so one table-wide writer is plenty.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::{HoldStatus, ScheduledHold, Shift};

use super::errors::{StoreError, StoreResult};
use super::snapshot::{read_snapshot, write_snapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HoldsSnapshot {
    holds: Vec<ScheduledHold>,
}

/// Filter for hold queries. All fields are conjunctive; `from`/`to` bound
/// the scheduled date inclusively.
#[derive(Debug, Clone, Default)]
pub struct HoldQuery {
    pub shift: Option<Shift>,
    pub status: Option<HoldStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HoldQuery {
    fn matches(&self, hold: &ScheduledHold) -> bool {
        if let Some(shift) = self.shift {
            if hold.shift != shift {
                return false;
            }
        }
        if let Some(status) = self.status {
            if hold.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if hold.scheduled_date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if hold.scheduled_date > to {
                return false;
            }
        }
        true
    }
}

/// Store for scheduled-hold records.
pub struct HoldStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HoldStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("holds.json"),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> StoreResult<HoldsSnapshot> {
        Ok(read_snapshot(&self.path)?.unwrap_or(HoldsSnapshot { holds: Vec::new() }))
    }

    fn save(&self, snapshot: &HoldsSnapshot) -> StoreResult<()> {
        write_snapshot(&self.path, snapshot)
    }

    /// Returns holds matching the query, newest scheduled date first.
    pub fn query(&self, query: &HoldQuery) -> StoreResult<Vec<ScheduledHold>> {
        let mut holds: Vec<ScheduledHold> = self
            .load()?
            .holds
            .into_iter()
            .filter(|h| query.matches(h))
            .collect();
        holds.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
        Ok(holds)
    }

    /// Fetches one hold by id.
    pub fn get(&self, id: Uuid) -> StoreResult<ScheduledHold> {
        self.load()?
            .holds
            .into_iter()
            .find(|h| h.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Appends a new hold record.
    pub fn append(&self, hold: ScheduledHold) -> StoreResult<()> {
        let _guard = lock(&self.write_lock);
        let mut snapshot = self.load()?;
        snapshot.holds.push(hold);
        self.save(&snapshot)
    }

    /// Applies `mutate` to the hold with `id` and persists the table.
    pub fn update<F>(&self, id: Uuid, mutate: F) -> StoreResult<ScheduledHold>
    where
        F: FnOnce(&mut ScheduledHold),
    {
        let _guard = lock(&self.write_lock);
        let mut snapshot = self.load()?;
        let hold = snapshot
            .holds
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(StoreError::NotFound(id))?;
        mutate(hold);
        let updated = hold.clone();
        self.save(&snapshot)?;
        Ok(updated)
    }

    /// Removes the hold with `id`, returning the removed record.
    pub fn delete(&self, id: Uuid) -> StoreResult<ScheduledHold> {
        let _guard = lock(&self.write_lock);
        let mut snapshot = self.load()?;
        let index = snapshot
            .holds
            .iter()
            .position(|h| h.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = snapshot.holds.remove(index);
        self.save(&snapshot)?;
        Ok(removed)
    }
}

fn lock(mutex: &Mutex<()>) -> std::sync::MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
