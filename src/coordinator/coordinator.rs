//! The mutation coordinator.
//!
//! Every roster/hold mutation follows the same sequence: take the shift
//! lock, load the current snapshot, run the rotation engine, persist the
//! whole re-densified list as one atomic versioned replace, append an
//! activity entry, publish a change event. The engine never sees the store
//! and the store never sees the engine; this module is the only place the
//! two meet.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::observability::{Logger, Severity};
use crate::realtime::{Backoff, EventKind, Notifier};
use crate::roster::{ActivityEntry, Firefighter, HoldDuration, HoldStatus, ScheduledHold, Shift};
use crate::rotation::{self, RotationError};
use crate::store::{HoldQuery, Store};

use super::errors::{CoordinatorError, CoordinatorResult};

// ==================
// Request / View Types
// ==================

/// Input for adding a member to a shift roster.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFirefighter {
    pub name: String,
    pub shift: Shift,
    #[serde(default)]
    pub fire_station: Option<String>,
    #[serde(default)]
    pub certification_level: Option<String>,
}

/// Input for completing a hold straight from the roster.
///
/// `new_position` is 1-indexed as commanders see it; omitted means the
/// bottom of the rotation.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteHoldRequest {
    pub hold_date: NaiveDate,
    #[serde(default)]
    pub new_position: Option<u32>,
    #[serde(default)]
    pub fire_station: Option<String>,
    #[serde(default)]
    pub lent_to_shift: Option<Shift>,
    #[serde(default)]
    pub duration: HoldDuration,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// Input for placing a hold on the calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleHoldRequest {
    pub firefighter_id: Uuid,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub fire_station: Option<String>,
    #[serde(default)]
    pub duration: HoldDuration,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A shift's rotation as presented to clients: available members first in
/// position order, next-up called out, inactive members on request.
#[derive(Debug, Clone, Serialize)]
pub struct RosterView {
    pub shift: Shift,
    pub version: u64,
    pub members: Vec<Firefighter>,
    pub next_up: Option<Firefighter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<Vec<Firefighter>>,
}

/// One shift's roster split into its position-bearing and deactivated
/// members.
struct ShiftRoster {
    version: u64,
    active: Vec<Firefighter>,
    inactive: Vec<Firefighter>,
}

// ==================
// Coordinator
// ==================

/// Serializes mutations per shift and wires the rotation engine to the
/// store and the notification channel.
pub struct Coordinator {
    store: Arc<Store>,
    notifier: Arc<Notifier>,
    shift_locks: [Mutex<()>; 3],
}

impl Coordinator {
    pub fn new(store: Arc<Store>, notifier: Arc<Notifier>) -> Self {
        Self {
            store,
            notifier,
            shift_locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    // ==================
    // Roster Queries
    // ==================

    /// Current rotation for a shift.
    pub fn roster(&self, shift: Shift, include_inactive: bool) -> CoordinatorResult<RosterView> {
        let roster = self.load_split(shift)?;
        Ok(RosterView {
            shift,
            version: roster.version,
            next_up: rotation::next_up(&roster.active).cloned(),
            members: rotation::sort_rotation(&roster.active),
            inactive: include_inactive.then_some(roster.inactive),
        })
    }

    /// Holds matching a filter.
    pub fn holds(&self, query: &HoldQuery) -> CoordinatorResult<Vec<ScheduledHold>> {
        Ok(self.store.holds().query(query)?)
    }

    /// Recent activity entries, newest first.
    pub fn activity(
        &self,
        shift: Option<Shift>,
        limit: usize,
    ) -> CoordinatorResult<Vec<ActivityEntry>> {
        Ok(self.store.activity().recent(shift, limit)?)
    }

    // ==================
    // Roster Mutations
    // ==================

    /// Adds a member at the bottom of their shift's rotation.
    pub fn add_firefighter(&self, req: NewFirefighter) -> CoordinatorResult<Firefighter> {
        let _guard = self.lock(req.shift);
        let roster = self.load_split(req.shift)?;

        let mut member = Firefighter::new(req.name, req.shift, roster.active.len() as u32);
        member.fire_station = req.fire_station;
        member.certification_level = req.certification_level;

        let mut active = roster.active;
        active.push(member.clone());
        self.persist(req.shift, roster.version, active, roster.inactive)?;

        self.record_activity(
            ActivityEntry::new("added", "Added to hold list", Some(req.shift))
                .with_firefighter(member.id, member.name.clone())
                .with_details(format!(
                    "Joined the rotation at position {}",
                    member.order_position + 1
                )),
        );
        self.notify(EventKind::Roster, req.shift, "added", Some(member.id));
        Ok(member)
    }

    /// Completes a hold for a roster member: stamps `last_hold_date`,
    /// reinserts them at the requested 1-indexed position (default bottom),
    /// and records a completed hold.
    pub fn complete_hold(
        &self,
        id: Uuid,
        req: CompleteHoldRequest,
    ) -> CoordinatorResult<ScheduledHold> {
        let shift = self.shift_of(id)?;
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        let member = roster
            .active
            .iter()
            .find(|ff| ff.id == id)
            .cloned()
            .ok_or(CoordinatorError::UnknownFirefighter(id))?;
        if !member.is_available {
            return Err(CoordinatorError::Unavailable { name: member.name });
        }

        let len = roster.active.len();
        let target = to_internal_position(req.new_position, len)?;
        let active = rotation::complete_hold(&roster.active, id, target, req.hold_date)?;
        self.persist(shift, roster.version, active, roster.inactive)?;

        let now = Utc::now();
        let mut hold = ScheduledHold::scheduled(
            id,
            Some(member.name.clone()),
            req.hold_date,
            shift,
        );
        hold.hold_date = Some(req.hold_date);
        hold.fire_station = req.fire_station.or_else(|| member.fire_station.clone());
        hold.status = HoldStatus::Completed;
        hold.completed_at = Some(now);
        hold.lent_to_shift = req.lent_to_shift;
        hold.duration = req.duration;
        if let Some(start_time) = req.start_time {
            hold.start_time = start_time;
        }
        hold.updated_at = now;
        self.store.holds().append(hold.clone())?;

        let position = target + 1;
        self.record_activity(
            ActivityEntry::new("completed_hold", "Completed hold", Some(shift))
                .with_firefighter(id, member.name)
                .with_details(format!("Completed hold and moved to position {}", position)),
        );
        self.notify(EventKind::Roster, shift, "completed_hold", Some(id));
        self.notify(EventKind::Holds, shift, "completed_hold", Some(hold.id));
        Ok(hold)
    }

    /// Voluntary skip: the member goes to the bottom without a hold being
    /// recorded.
    pub fn move_to_bottom(&self, id: Uuid) -> CoordinatorResult<()> {
        let shift = self.shift_of(id)?;
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        let name = self.active_name(&roster, id)?;
        let bottom = roster.active.len();
        let active = rotation::move_to_bottom(&roster.active, id)?;
        self.persist(shift, roster.version, active, roster.inactive)?;

        self.record_activity(
            ActivityEntry::new("voluntary_hold", "Passed on a hold", Some(shift))
                .with_firefighter(id, name)
                .with_details(format!(
                    "Moved to position {} (voluntary hold/skip)",
                    bottom
                )),
        );
        self.notify(EventKind::Roster, shift, "voluntary_hold", Some(id));
        Ok(())
    }

    /// Removes a member from position bookkeeping. Idempotent: deactivating
    /// an already-inactive member is a no-op.
    pub fn deactivate(&self, id: Uuid) -> CoordinatorResult<()> {
        let shift = self.shift_of(id)?;
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        if !roster.active.iter().any(|ff| ff.id == id) {
            return Ok(());
        }

        let (member, active) = rotation::deactivate(&roster.active, id)?;
        let mut inactive = roster.inactive;
        inactive.push(member.clone());
        self.persist(shift, roster.version, active, inactive)?;

        self.record_activity(
            ActivityEntry::new("deactivated", "Deactivated from roster", Some(shift))
                .with_firefighter(id, member.name)
                .with_details("Deactivated from roster (history preserved)"),
        );
        self.notify(EventKind::Roster, shift, "deactivated", Some(id));
        Ok(())
    }

    /// Brings a deactivated member back, always at the front of the
    /// rotation.
    pub fn reactivate(&self, id: Uuid) -> CoordinatorResult<()> {
        let shift = self.shift_of(id)?;
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        let mut inactive = roster.inactive;
        let index = inactive
            .iter()
            .position(|ff| ff.id == id)
            .ok_or(CoordinatorError::UnknownFirefighter(id))?;
        let member = inactive.remove(index);
        let name = member.name.clone();

        let active = rotation::reactivate(&roster.active, member);
        self.persist(shift, roster.version, active, inactive)?;

        self.record_activity(
            ActivityEntry::new("reactivated", "Reactivated", Some(shift))
                .with_firefighter(id, name)
                .with_details("Reactivated and placed at position 1"),
        );
        self.notify(EventKind::Roster, shift, "reactivated", Some(id));
        Ok(())
    }

    /// Flags a member as available/unavailable without touching positions.
    pub fn set_availability(&self, id: Uuid, is_available: bool) -> CoordinatorResult<()> {
        let shift = self.shift_of(id)?;
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        let mut active = roster.active;
        let member = active
            .iter_mut()
            .find(|ff| ff.id == id)
            .ok_or(CoordinatorError::UnknownFirefighter(id))?;
        member.is_available = is_available;
        let name = member.name.clone();
        self.persist(shift, roster.version, active, roster.inactive)?;

        let detail = if is_available {
            "Returned to rotation"
        } else {
            "Temporarily out of rotation"
        };
        self.record_activity(
            ActivityEntry::new("availability_changed", detail, Some(shift))
                .with_firefighter(id, name),
        );
        self.notify(EventKind::Roster, shift, "availability_changed", Some(id));
        Ok(())
    }

    /// Moves a member to another shift, landing at the bottom of the
    /// destination rotation with their hold history cleared.
    pub fn transfer(&self, id: Uuid, to_shift: Shift) -> CoordinatorResult<()> {
        let member = self
            .store
            .roster()
            .find(id)?
            .ok_or(CoordinatorError::UnknownFirefighter(id))?;
        let from_shift = member.shift;
        if from_shift == to_shift {
            return Err(CoordinatorError::AlreadyOnShift {
                name: member.name,
                shift: to_shift,
            });
        }

        let (_first, _second) = self.lock_pair(from_shift, to_shift);
        let source = self.load_split(from_shift)?;
        let dest = self.load_split(to_shift)?;

        let (moved, source_active) = rotation::remove(&source.active, id)
            .map_err(|_| CoordinatorError::UnknownFirefighter(id))?;
        let name = moved.name.clone();
        let dest_active = rotation::transfer_in(&dest.active, moved, to_shift);

        // Destination first: a crash between the two writes leaves the
        // member visible on both shifts, which an operator can see and fix;
        // source-first would drop them from the rotation entirely.
        self.persist(to_shift, dest.version, dest_active, dest.inactive)?;
        self.persist(from_shift, source.version, source_active, source.inactive)?;

        self.record_activity(
            ActivityEntry::new("shift_transfer", "Transferred shifts", Some(to_shift))
                .with_firefighter(id, name)
                .with_details(format!(
                    "Transferred from Shift {} to Shift {} (placed at end)",
                    from_shift, to_shift
                )),
        );
        self.notify(EventKind::Roster, from_shift, "shift_transfer", Some(id));
        self.notify(EventKind::Roster, to_shift, "shift_transfer", Some(id));
        Ok(())
    }

    /// Applies an explicit full ordering for a shift (drag-and-drop).
    pub fn reorder(&self, shift: Shift, ids: &[Uuid]) -> CoordinatorResult<()> {
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        let active = rotation::reorder(&roster.active, ids)?;
        self.persist(shift, roster.version, active, roster.inactive)?;

        self.record_activity(ActivityEntry::new(
            "reorder",
            "Roster order updated manually",
            Some(shift),
        ));
        self.notify(EventKind::Roster, shift, "reorder", None);
        Ok(())
    }

    /// Deletes a member outright. Hold history is preserved; only the
    /// roster row goes away.
    pub fn remove_firefighter(&self, id: Uuid) -> CoordinatorResult<()> {
        let shift = self.shift_of(id)?;
        let _guard = self.lock(shift);
        let roster = self.load_split(shift)?;

        let name;
        let (active, inactive) = if roster.active.iter().any(|ff| ff.id == id) {
            let (removed, rest) = rotation::remove(&roster.active, id)?;
            name = removed.name;
            (rest, roster.inactive)
        } else {
            let mut inactive = roster.inactive;
            let index = inactive
                .iter()
                .position(|ff| ff.id == id)
                .ok_or(CoordinatorError::UnknownFirefighter(id))?;
            name = inactive.remove(index).name;
            (roster.active, inactive)
        };
        self.persist(shift, roster.version, active, inactive)?;

        self.record_activity(
            ActivityEntry::new("removed", "Removed from roster", Some(shift))
                .with_firefighter(id, name)
                .with_details("Removed from rotation (hold history preserved)"),
        );
        self.notify(EventKind::Roster, shift, "removed", Some(id));
        Ok(())
    }

    // ==================
    // Hold Mutations
    // ==================

    /// Places a hold on the calendar in the `Scheduled` state. Positions
    /// are untouched until the hold completes.
    pub fn schedule_hold(&self, req: ScheduleHoldRequest) -> CoordinatorResult<ScheduledHold> {
        let member = self
            .store
            .roster()
            .find(req.firefighter_id)?
            .ok_or(CoordinatorError::UnknownFirefighter(req.firefighter_id))?;
        let shift = member.shift;
        let _guard = self.lock(shift);

        let mut hold = ScheduledHold::scheduled(
            member.id,
            Some(member.name.clone()),
            req.scheduled_date,
            shift,
        );
        hold.fire_station = req.fire_station.or_else(|| member.fire_station.clone());
        hold.duration = req.duration;
        if let Some(start_time) = req.start_time {
            hold.start_time = start_time;
        }
        hold.notes = req.notes;
        self.store.holds().append(hold.clone())?;

        self.record_activity(
            ActivityEntry::new("hold_scheduled", "Scheduled a hold", Some(shift))
                .with_firefighter(member.id, member.name)
                .with_details(format!("Scheduled hold for {}", req.scheduled_date)),
        );
        self.notify(EventKind::Holds, shift, "hold_scheduled", Some(hold.id));
        Ok(hold)
    }

    /// Completes a scheduled hold: transitions the record and runs the
    /// rotation for the holder (to the bottom unless a 1-indexed position
    /// override is given). If the holder has since left the roster, only
    /// the record transitions.
    pub fn complete_scheduled_hold(
        &self,
        hold_id: Uuid,
        new_position: Option<u32>,
    ) -> CoordinatorResult<ScheduledHold> {
        let shift = self.store.holds().get(hold_id)?.shift;
        let _guard = self.lock(shift);

        let hold = self.store.holds().get(hold_id)?;
        if hold.status != HoldStatus::Scheduled {
            return Err(CoordinatorError::InvalidTransition {
                id: hold_id,
                status: hold.status,
            });
        }

        let roster = self.load_split(shift)?;
        if let Some(member) = roster.active.iter().find(|ff| ff.id == hold.firefighter_id) {
            if !member.is_available {
                return Err(CoordinatorError::Unavailable {
                    name: member.name.clone(),
                });
            }
            let target = to_internal_position(new_position, roster.active.len())?;
            let active = rotation::complete_hold(
                &roster.active,
                member.id,
                target,
                hold.scheduled_date,
            )?;
            self.persist(shift, roster.version, active, roster.inactive)?;
        }

        let now = Utc::now();
        let updated = self.store.holds().update(hold_id, |h| {
            h.status = HoldStatus::Completed;
            h.completed_at = Some(now);
            h.hold_date = Some(h.scheduled_date);
            h.updated_at = now;
        })?;

        self.record_activity(
            ActivityEntry::new("completed_hold", "Completed scheduled hold", Some(shift))
                .with_firefighter(
                    updated.firefighter_id,
                    updated.firefighter_name.clone().unwrap_or_default(),
                )
                .with_details(format!("Completed hold for {}", updated.scheduled_date)),
        );
        self.notify(EventKind::Roster, shift, "completed_hold", Some(updated.firefighter_id));
        self.notify(EventKind::Holds, shift, "completed_hold", Some(hold_id));
        Ok(updated)
    }

    /// Marks a scheduled hold skipped. No position mutation: the holder
    /// never served.
    pub fn skip_scheduled_hold(&self, hold_id: Uuid) -> CoordinatorResult<ScheduledHold> {
        let shift = self.store.holds().get(hold_id)?.shift;
        let _guard = self.lock(shift);

        let hold = self.store.holds().get(hold_id)?;
        if hold.status != HoldStatus::Scheduled {
            return Err(CoordinatorError::InvalidTransition {
                id: hold_id,
                status: hold.status,
            });
        }

        let now = Utc::now();
        let updated = self.store.holds().update(hold_id, |h| {
            h.status = HoldStatus::Skipped;
            h.updated_at = now;
        })?;

        self.record_activity(
            ActivityEntry::new("hold_skipped", "Skipped a hold", Some(shift))
                .with_firefighter(
                    updated.firefighter_id,
                    updated.firefighter_name.clone().unwrap_or_default(),
                )
                .with_details(format!("Skipped hold for {}", updated.scheduled_date)),
        );
        self.notify(EventKind::Holds, shift, "hold_skipped", Some(hold_id));
        Ok(updated)
    }

    /// Removes a hold from the calendar. Allowed only while still
    /// scheduled; served history is immutable.
    pub fn delete_scheduled_hold(&self, hold_id: Uuid) -> CoordinatorResult<()> {
        let shift = self.store.holds().get(hold_id)?.shift;
        let _guard = self.lock(shift);

        let hold = self.store.holds().get(hold_id)?;
        if hold.status != HoldStatus::Scheduled {
            return Err(CoordinatorError::InvalidTransition {
                id: hold_id,
                status: hold.status,
            });
        }

        let removed = self.store.holds().delete(hold_id)?;
        self.record_activity(
            ActivityEntry::new("hold_deleted", "Deleted scheduled hold", Some(shift))
                .with_firefighter(
                    removed.firefighter_id,
                    removed.firefighter_name.clone().unwrap_or_default(),
                )
                .with_details(format!("Deleted scheduled hold for {}", removed.scheduled_date)),
        );
        self.notify(EventKind::Holds, shift, "hold_deleted", Some(hold_id));
        Ok(())
    }

    // ==================
    // Internals
    // ==================

    fn lock(&self, shift: Shift) -> MutexGuard<'_, ()> {
        self.shift_locks[shift.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Locks two shifts in enum order so concurrent transfers cannot
    /// deadlock.
    fn lock_pair(&self, a: Shift, b: Shift) -> (MutexGuard<'_, ()>, MutexGuard<'_, ()>) {
        let (first, second) = if a.index() < b.index() { (a, b) } else { (b, a) };
        (self.lock(first), self.lock(second))
    }

    fn shift_of(&self, id: Uuid) -> CoordinatorResult<Shift> {
        self.store
            .roster()
            .find(id)?
            .map(|ff| ff.shift)
            .ok_or(CoordinatorError::UnknownFirefighter(id))
    }

    fn load_split(&self, shift: Shift) -> CoordinatorResult<ShiftRoster> {
        let snapshot = self.store.roster().load(shift)?;
        let (mut active, inactive): (Vec<Firefighter>, Vec<Firefighter>) = snapshot
            .members
            .into_iter()
            .partition(|ff| ff.is_active);
        active.sort_by_key(|ff| ff.order_position);
        Ok(ShiftRoster {
            version: snapshot.version,
            active,
            inactive,
        })
    }

    fn persist(
        &self,
        shift: Shift,
        expected_version: u64,
        active: Vec<Firefighter>,
        inactive: Vec<Firefighter>,
    ) -> CoordinatorResult<u64> {
        let now = Utc::now();
        let mut members = active;
        for member in &mut members {
            member.updated_at = now;
        }
        members.extend(inactive);
        Ok(self.store.roster().replace(shift, expected_version, members)?)
    }

    fn active_name(&self, roster: &ShiftRoster, id: Uuid) -> CoordinatorResult<String> {
        roster
            .active
            .iter()
            .find(|ff| ff.id == id)
            .map(|ff| ff.name.clone())
            .ok_or(CoordinatorError::UnknownFirefighter(id))
    }

    /// Activity appends must not undo an already-persisted mutation, so a
    /// failed append is logged and swallowed.
    fn record_activity(&self, entry: ActivityEntry) {
        if let Err(err) = self.store.activity().append(&entry) {
            Logger::log_stderr(
                Severity::Warn,
                "activity_append_failed",
                &[("action", &entry.action), ("error", &err.to_string())],
            );
        }
    }

    /// Publishes a change event, retrying transient failures with bounded
    /// exponential backoff. Rotation state is never recomputed here; only
    /// the publish repeats.
    fn notify(&self, kind: EventKind, shift: Shift, action: &str, record_id: Option<Uuid>) {
        let mut backoff = Backoff::default();
        loop {
            match self.notifier.publish(kind, shift, action, record_id) {
                Ok((event, reached)) => {
                    Logger::log(
                        Severity::Info,
                        "event_published",
                        &[
                            ("action", action),
                            ("topic", &event.topic()),
                            ("sequence", &event.sequence.to_string()),
                            ("subscribers", &reached.to_string()),
                        ],
                    );
                    return;
                }
                Err(err) => match backoff.next_delay() {
                    Some(delay) => {
                        Logger::log_stderr(
                            Severity::Warn,
                            "notify_retry",
                            &[
                                ("action", action),
                                ("attempt", &backoff.attempts().to_string()),
                                ("error", &err.to_string()),
                            ],
                        );
                        thread::sleep(delay);
                    }
                    None => {
                        Logger::log_stderr(
                            Severity::Error,
                            "notify_failed",
                            &[("action", action), ("error", &err.to_string())],
                        );
                        return;
                    }
                },
            }
        }
    }
}

/// Converts a caller-facing 1-indexed position (default: bottom) to the
/// engine's 0-indexed slot.
fn to_internal_position(
    new_position: Option<u32>,
    len: usize,
) -> Result<usize, CoordinatorError> {
    let requested = new_position.unwrap_or(len as u32);
    if requested == 0 {
        return Err(CoordinatorError::Rotation(RotationError::InvalidPosition {
            position: 0,
            len,
        }));
    }
    Ok((requested - 1) as usize)
}
