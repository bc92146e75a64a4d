//! # Realtime Notifications
//!
//! After a mutation persists, the coordinator publishes a [`ChangeEvent`]
//! so other connected viewers can re-fetch. Delivery is best-effort pub/sub
//! over per-topic broadcast channels (`roster:{shift}`, `holds:{shift}`),
//! fanned out to WebSocket clients by
//! [`crate::http_server::realtime_routes`].
//!
//! Transient publish failures are retried with bounded exponential backoff
//! ([`retry::Backoff`]); rotation state is never recomputed on retry.

pub mod broadcast;
pub mod errors;
pub mod event;
pub mod retry;

pub use broadcast::{Notifier, TopicStats};
pub use errors::{RealtimeError, RealtimeResult};
pub use event::{parse_topic, topic_for, ChangeEvent, EventKind};
pub use retry::Backoff;
