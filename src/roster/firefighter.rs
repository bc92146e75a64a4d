//! Firefighter roster entries and the shift partition.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the three duty shifts. Each shift owns an independent rotation
/// sequence; positions are never compared across shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shift {
    A,
    B,
    C,
}

impl Shift {
    /// All shifts, in lock-acquisition order.
    pub const ALL: [Shift; 3] = [Shift::A, Shift::B, Shift::C];

    /// Returns the shift letter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::A => "A",
            Shift::B => "B",
            Shift::C => "C",
        }
    }

    /// Index into per-shift arrays (locks, roster files).
    pub fn index(&self) -> usize {
        match self {
            Shift::A => 0,
            Shift::B => 1,
            Shift::C => 2,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Shift::A),
            "B" => Ok(Shift::B),
            "C" => Ok(Shift::C),
            other => Err(format!("Unknown shift: {}", other)),
        }
    }
}

/// A roster entry for one shift.
///
/// Within a shift, the active members' `order_position` values form the
/// contiguous range `0..N`, lowest position = next up for a hold. The
/// rotation engine owns that invariant; everything else here is descriptive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firefighter {
    pub id: Uuid,
    pub name: String,
    pub shift: Shift,

    /// Station number label, e.g. "4". Free-form because departments number
    /// stations however they like.
    pub fire_station: Option<String>,

    /// Rotation slot within the shift. Meaningful only while `is_active`.
    pub order_position: u32,

    /// False while lent out or otherwise unable to take a hold; the member
    /// keeps their slot but is skipped by next-up selection.
    pub is_available: bool,

    /// False once deactivated. Inactive members hold no position slot.
    pub is_active: bool,

    /// Most recent date this member completed a hold.
    pub last_hold_date: Option<NaiveDate>,

    pub certification_level: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Firefighter {
    /// Creates a new active, available member at the given position.
    pub fn new(name: impl Into<String>, shift: Shift, order_position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            shift,
            fire_station: None,
            order_position,
            is_available: true,
            is_active: true,
            last_hold_date: None,
            certification_level: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_round_trip() {
        for shift in Shift::ALL {
            assert_eq!(shift.as_str().parse::<Shift>().unwrap(), shift);
        }
    }

    #[test]
    fn test_shift_parse_is_case_insensitive() {
        assert_eq!("b".parse::<Shift>().unwrap(), Shift::B);
        assert_eq!(" c ".parse::<Shift>().unwrap(), Shift::C);
        assert!("D".parse::<Shift>().is_err());
    }

    #[test]
    fn test_new_firefighter_defaults() {
        let ff = Firefighter::new("Alvarez", Shift::A, 3);
        assert!(ff.is_active);
        assert!(ff.is_available);
        assert_eq!(ff.order_position, 3);
        assert!(ff.last_hold_date.is_none());
    }
}
