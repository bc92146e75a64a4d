//! # Rotation Engine
//!
//! The ordering core of holdline. Given a snapshot of one shift's active
//! roster (in rotation order) and an event (hold completed, voluntary skip,
//! deactivation, reactivation, transfer, manual reorder), these functions
//! compute the new ordering and re-densify `order_position` so the active
//! members always occupy exactly `0..N`.
//!
//! Everything here is a pure function: list in, new list out, no I/O, no
//! shared state. Persistence, locking, activity logging, and notifications
//! belong to [`crate::coordinator`].

pub mod engine;
pub mod errors;

pub use engine::{
    assign_positions, complete_hold, deactivate, move_to_bottom, next_up, reactivate, remove,
    reorder, sort_rotation, transfer_in,
};
pub use errors::{RotationError, RotationResult};
