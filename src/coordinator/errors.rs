//! Coordinator error types.
//!
//! Every mutation failure maps to one stable code and HTTP status so the
//! API layer never has to pattern-match error internals.

use thiserror::Error;
use uuid::Uuid;

use crate::roster::{HoldStatus, Shift};
use crate::rotation::RotationError;
use crate::store::StoreError;

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Mutation failures surfaced to callers.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Deterministic validation failure from the rotation engine.
    #[error(transparent)]
    Rotation(#[from] RotationError),

    /// Persistence failure (I/O, corruption, stale version).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The referenced member is not on any roster.
    #[error("Firefighter not found: {0}")]
    UnknownFirefighter(Uuid),

    /// The member cannot take a hold while flagged unavailable.
    #[error("{name} is unavailable and cannot take a hold")]
    Unavailable { name: String },

    /// Transfer to the shift the member is already on.
    #[error("{name} is already on shift {shift}")]
    AlreadyOnShift { name: String, shift: Shift },

    /// Hold lifecycle violation: only scheduled holds change state.
    #[error("Hold {id} is {status}; only scheduled holds can change state")]
    InvalidTransition { id: Uuid, status: HoldStatus },
}

impl CoordinatorError {
    /// Stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rotation(RotationError::NotFound(_)) => "NOT_FOUND",
            Self::Rotation(RotationError::InvalidPosition { .. }) => "INVALID_POSITION",
            Self::Store(StoreError::VersionConflict { .. }) => "VERSION_CONFLICT",
            Self::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::UnknownFirefighter(_) => "NOT_FOUND",
            Self::Unavailable { .. } => "UNAVAILABLE",
            Self::AlreadyOnShift { .. } => "ALREADY_ON_SHIFT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// HTTP status the API layer responds with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rotation(RotationError::NotFound(_)) => 404,
            Self::Rotation(RotationError::InvalidPosition { .. }) => 400,
            Self::Store(StoreError::VersionConflict { .. }) => 409,
            Self::Store(StoreError::NotFound(_)) => 404,
            Self::Store(_) => 500,
            Self::UnknownFirefighter(_) => 404,
            Self::Unavailable { .. } => 409,
            Self::AlreadyOnShift { .. } => 409,
            Self::InvalidTransition { .. } => 409,
        }
    }

    /// Whether a retry with fresh state could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::VersionConflict { .. }))
    }
}
