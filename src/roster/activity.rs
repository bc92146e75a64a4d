//! Append-only activity entries.
//!
//! Every roster or hold mutation leaves one entry behind: who, what, when.
//! Entries are written by the coordinator, never by the rotation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::firefighter::Shift;

/// One audit record. `action` is a short machine tag ("completed_hold",
/// "shift_transfer", ...); `description` is the human-readable line shown in
/// the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub firefighter_id: Option<Uuid>,
    pub firefighter_name: Option<String>,
    pub action: String,
    pub description: String,
    pub details: Option<String>,
    pub shift: Option<Shift>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        action: impl Into<String>,
        description: impl Into<String>,
        shift: Option<Shift>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            firefighter_id: None,
            firefighter_name: None,
            action: action.into(),
            description: description.into(),
            details: None,
            shift,
            created_at: Utc::now(),
        }
    }

    pub fn with_firefighter(mut self, id: Uuid, name: impl Into<String>) -> Self {
        self.firefighter_id = Some(id);
        self.firefighter_name = Some(name.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_fields() {
        let id = Uuid::new_v4();
        let entry = ActivityEntry::new("completed_hold", "Completed hold", Some(Shift::A))
            .with_firefighter(id, "Reyes")
            .with_details("Moved to position 5");

        assert_eq!(entry.firefighter_id, Some(id));
        assert_eq!(entry.firefighter_name.as_deref(), Some("Reyes"));
        assert_eq!(entry.details.as_deref(), Some("Moved to position 5"));
        assert_eq!(entry.shift, Some(Shift::A));
    }
}
