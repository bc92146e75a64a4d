//! # Roster Domain Model
//!
//! Value types shared across the rotation engine, the store, and the
//! coordinator: firefighters, shifts, scheduled holds, and activity entries.
//!
//! These are plain serde-serializable snapshots. Nothing in this module
//! performs I/O; ordering rules live in [`crate::rotation`] and persistence
//! in [`crate::store`].

pub mod activity;
pub mod firefighter;
pub mod hold;

pub use activity::ActivityEntry;
pub use firefighter::{Firefighter, Shift};
pub use hold::{HoldDuration, HoldStatus, ScheduledHold};
