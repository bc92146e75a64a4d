//! Topic-keyed pub/sub fan-out.
//!
//! One `tokio::sync::broadcast` channel per topic, created lazily on first
//! subscribe or publish. Publishing is fire-and-forget: an event with no
//! subscribers is dropped, and a lagging subscriber loses old events rather
//! than blocking the writer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::roster::Shift;

use super::errors::{RealtimeError, RealtimeResult};
use super::event::{topic_for, ChangeEvent, EventKind};

const CHANNEL_CAPACITY: usize = 256;

/// Per-topic subscriber/publish counters for the stats endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TopicStats {
    pub topic: String,
    pub subscribers: usize,
}

/// The notification channel: coordinators publish, WebSocket connections
/// subscribe.
pub struct Notifier {
    channels: RwLock<HashMap<String, broadcast::Sender<ChangeEvent>>>,
    sequence: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Subscribes to a topic, creating its channel if this is the first
    /// listener.
    pub fn subscribe(&self, kind: EventKind, shift: Shift) -> broadcast::Receiver<ChangeEvent> {
        let topic = topic_for(kind, shift);
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publishes a change event, returning it (with its assigned sequence)
    /// and the number of subscribers it reached.
    pub fn publish(
        &self,
        kind: EventKind,
        shift: Shift,
        action: &str,
        record_id: Option<Uuid>,
    ) -> RealtimeResult<(ChangeEvent, usize)> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = ChangeEvent::new(sequence, kind, shift, action, record_id);

        let channels = self
            .channels
            .read()
            .map_err(|_| RealtimeError::Internal("notifier lock poisoned".to_string()))?;

        let reached = match channels.get(&event.topic()) {
            // send only errors when every receiver is gone; that is a
            // zero-subscriber publish, not a failure.
            Some(sender) => sender.send(event.clone()).unwrap_or(0),
            None => 0,
        };
        Ok((event, reached))
    }

    /// Last sequence number handed out.
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Snapshot of per-topic subscriber counts.
    pub fn stats(&self) -> Vec<TopicStats> {
        let channels = self
            .channels
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut stats: Vec<TopicStats> = channels
            .iter()
            .map(|(topic, sender)| TopicStats {
                topic: topic.clone(),
                subscribers: sender.receiver_count(),
            })
            .collect();
        stats.sort_by(|a, b| a.topic.cmp(&b.topic));
        stats
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe(EventKind::Roster, Shift::A);

        let (event, reached) = notifier
            .publish(EventKind::Roster, Shift::A, "added", None)
            .unwrap();
        assert_eq!(reached, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.sequence, event.sequence);
        assert_eq!(received.action, "added");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_reaches_nobody() {
        let notifier = Notifier::new();
        let (_, reached) = notifier
            .publish(EventKind::Holds, Shift::B, "hold_scheduled", None)
            .unwrap();
        assert_eq!(reached, 0);
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic_across_topics() {
        let notifier = Notifier::new();
        let (first, _) = notifier
            .publish(EventKind::Roster, Shift::A, "added", None)
            .unwrap();
        let (second, _) = notifier
            .publish(EventKind::Holds, Shift::C, "hold_skipped", None)
            .unwrap();

        assert!(second.sequence > first.sequence);
        assert_eq!(notifier.last_sequence(), second.sequence);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let notifier = Notifier::new();
        let mut roster_rx = notifier.subscribe(EventKind::Roster, Shift::A);
        let mut holds_rx = notifier.subscribe(EventKind::Holds, Shift::A);

        notifier
            .publish(EventKind::Holds, Shift::A, "hold_scheduled", None)
            .unwrap();

        let received = holds_rx.recv().await.unwrap();
        assert_eq!(received.kind, EventKind::Holds);
        assert!(roster_rx.try_recv().is_err());
    }
}
