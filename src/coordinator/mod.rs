//! # Mutation Coordinator
//!
//! Glue between the pure rotation engine, the embedded store, and the
//! notification channel. The coordinator loads the current roster
//! snapshot, asks the engine for the next one, persists it atomically,
//! appends the audit entry, and publishes the change event, in that
//! order, under a per-shift writer lock.

pub mod coordinator;
pub mod errors;

pub use coordinator::{
    CompleteHoldRequest, Coordinator, NewFirefighter, RosterView, ScheduleHoldRequest,
};
pub use errors::{CoordinatorError, CoordinatorResult};
