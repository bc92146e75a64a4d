//! Rotation engine errors.

use thiserror::Error;
use uuid::Uuid;

/// Result type for rotation operations
pub type RotationResult<T> = Result<T, RotationError>;

/// Deterministic validation failures. The engine performs no I/O, so these
/// are the only ways it can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// The referenced member is not in the supplied snapshot, or a reorder
    /// did not name every member exactly once.
    #[error("Firefighter not found in rotation: {0}")]
    NotFound(Uuid),

    /// Target position falls outside the list.
    #[error("Invalid position {position} for a rotation of {len}")]
    InvalidPosition { position: usize, len: usize },
}
