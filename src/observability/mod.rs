//! # Observability
//!
//! Structured logging for mutation attempts and outcomes. One JSON line per
//! event, synchronous, deterministic key ordering.

pub mod logger;

pub use logger::{Logger, Severity};
