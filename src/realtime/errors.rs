//! Realtime notification errors.

use thiserror::Error;

/// Result type for realtime operations
pub type RealtimeResult<T> = Result<T, RealtimeError>;

/// Notification channel errors.
#[derive(Debug, Clone, Error)]
pub enum RealtimeError {
    /// Topic string does not name a known channel family.
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// Publishing kept failing after the bounded retry budget.
    #[error("Notification delivery failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Internal failure (poisoned lock and the like).
    #[error("Internal realtime error: {0}")]
    Internal(String),
}
