//! Scheduled holds and their lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::firefighter::Shift;

/// Lifecycle state of a hold.
///
/// The only transitions are `Scheduled -> Completed` and
/// `Scheduled -> Skipped`. Completing is the event that feeds the rotation
/// engine; skipping and deletion leave positions untouched because the
/// member never served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldStatus {
    Scheduled,
    Completed,
    Skipped,
}

impl HoldStatus {
    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: HoldStatus) -> bool {
        matches!(
            (self, next),
            (HoldStatus::Scheduled, HoldStatus::Completed)
                | (HoldStatus::Scheduled, HoldStatus::Skipped)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldStatus::Scheduled => "scheduled",
            HoldStatus::Completed => "completed",
            HoldStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for HoldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HoldStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(HoldStatus::Scheduled),
            "completed" => Ok(HoldStatus::Completed),
            "skipped" => Ok(HoldStatus::Skipped),
            other => Err(format!("Unknown hold status: {}", other)),
        }
    }
}

/// Hold length. Most departments run 24-hour holds; 12-hour covers split
/// coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldDuration {
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl Default for HoldDuration {
    fn default() -> Self {
        HoldDuration::TwentyFourHours
    }
}

impl fmt::Display for HoldDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldDuration::TwelveHours => write!(f, "12h"),
            HoldDuration::TwentyFourHours => write!(f, "24h"),
        }
    }
}

fn default_start_time() -> String {
    "07:00".to_string()
}

/// A hold placed on the calendar for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledHold {
    pub id: Uuid,
    pub firefighter_id: Uuid,

    /// Denormalized so hold history survives roster deletions.
    pub firefighter_name: Option<String>,

    pub scheduled_date: NaiveDate,

    /// The date actually served; set when the hold completes.
    pub hold_date: Option<NaiveDate>,

    pub shift: Shift,
    pub fire_station: Option<String>,
    pub status: HoldStatus,

    /// Set when the member served this hold on loan to another shift.
    pub lent_to_shift: Option<Shift>,

    #[serde(default)]
    pub duration: HoldDuration,

    #[serde(default = "default_start_time")]
    pub start_time: String,

    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledHold {
    /// Creates a hold in the `Scheduled` state.
    pub fn scheduled(
        firefighter_id: Uuid,
        firefighter_name: Option<String>,
        scheduled_date: NaiveDate,
        shift: Shift,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            firefighter_id,
            firefighter_name,
            scheduled_date,
            hold_date: None,
            shift,
            fire_station: None,
            status: HoldStatus::Scheduled,
            lent_to_shift: None,
            duration: HoldDuration::default(),
            start_time: default_start_time(),
            completed_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
