//! Change events published after successful mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::roster::Shift;

use super::errors::{RealtimeError, RealtimeResult};

/// Which table family changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Roster,
    Holds,
}

impl EventKind {
    fn prefix(&self) -> &'static str {
        match self {
            EventKind::Roster => "roster",
            EventKind::Holds => "holds",
        }
    }
}

/// One roster/hold change, fanned out to every subscriber of its topic.
///
/// `sequence` increases monotonically across all topics, so a client that
/// sees a gap knows it missed events and should re-fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub sequence: u64,
    pub kind: EventKind,
    pub shift: Shift,

    /// The activity action tag that caused this event ("completed_hold",
    /// "shift_transfer", ...).
    pub action: String,

    /// Id of the changed record, when one record is the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(
        sequence: u64,
        kind: EventKind,
        shift: Shift,
        action: impl Into<String>,
        record_id: Option<Uuid>,
    ) -> Self {
        Self {
            sequence,
            kind,
            shift,
            action: action.into(),
            record_id,
            timestamp: Utc::now(),
        }
    }

    /// Topic this event fans out on: `roster:A`, `holds:C`, ...
    pub fn topic(&self) -> String {
        topic_for(self.kind, self.shift)
    }

    /// Wire shape sent to WebSocket clients.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "type": "change",
            "topic": self.topic(),
            "payload": self,
        })
    }
}

/// Builds the topic string for a kind/shift pair.
pub fn topic_for(kind: EventKind, shift: Shift) -> String {
    format!("{}:{}", kind.prefix(), shift)
}

/// Parses a client-supplied topic string, rejecting anything that is not a
/// known channel family plus a shift letter.
pub fn parse_topic(topic: &str) -> RealtimeResult<(EventKind, Shift)> {
    let (prefix, shift) = topic
        .split_once(':')
        .ok_or_else(|| RealtimeError::InvalidTopic(topic.to_string()))?;

    let kind = match prefix {
        "roster" => EventKind::Roster,
        "holds" => EventKind::Holds,
        _ => return Err(RealtimeError::InvalidTopic(topic.to_string())),
    };
    let shift = shift
        .parse::<Shift>()
        .map_err(|_| RealtimeError::InvalidTopic(topic.to_string()))?;
    Ok((kind, shift))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_round_trip() {
        let topic = topic_for(EventKind::Roster, Shift::B);
        assert_eq!(topic, "roster:B");
        assert_eq!(parse_topic(&topic).unwrap(), (EventKind::Roster, Shift::B));
    }

    #[test]
    fn test_parse_rejects_unknown_topics() {
        assert!(parse_topic("presence:A").is_err());
        assert!(parse_topic("roster:D").is_err());
        assert!(parse_topic("roster").is_err());
    }

    #[test]
    fn test_wire_format_carries_topic_and_sequence() {
        let event = ChangeEvent::new(42, EventKind::Holds, Shift::C, "hold_skipped", None);
        let wire = event.to_wire();
        assert_eq!(wire["type"], "change");
        assert_eq!(wire["topic"], "holds:C");
        assert_eq!(wire["payload"]["sequence"], 42);
    }
}
