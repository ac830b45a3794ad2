use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Days in the planning week, Monday = 0 .. Sunday = 6
pub const DAYS_PER_WEEK: u8 = 7;

/// First hour shown in the weekly grid
pub const FIRST_PLANNING_HOUR: u8 = 7;
/// Last hour shown in the weekly grid
pub const LAST_PLANNING_HOUR: u8 = 22;

pub const DAY_NAMES: [&str; DAYS_PER_WEEK as usize] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A calendar position in the weekly grid.
///
/// Serialized as the `"day-hour"` string (e.g. `"3-14"` for Thursday at 14h)
/// so the persisted store keeps the original slot-key format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    /// Day index, 0 = Monday .. 6 = Sunday
    pub day: u8,
    /// Hour of day, 0..=23
    pub hour: u8,
}

impl Slot {
    pub fn new(day: u8, hour: u8) -> Option<Slot> {
        if day < DAYS_PER_WEEK && hour < 24 {
            Some(Slot { day, hour })
        } else {
            None
        }
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[self.day as usize]
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.hour)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SlotParseError {
    #[error("Invalid slot '{0}': expected \"day-hour\" (e.g. \"3-14\")")]
    Format(String),

    #[error("Day index {0} is out of range (0 = Monday .. 6 = Sunday)")]
    DayOutOfRange(u8),

    #[error("Hour {0} is out of range (0..=23)")]
    HourOutOfRange(u8),
}

impl FromStr for Slot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, hour) = s
            .split_once('-')
            .ok_or_else(|| SlotParseError::Format(s.to_string()))?;
        let day: u8 = day
            .trim()
            .parse()
            .map_err(|_| SlotParseError::Format(s.to_string()))?;
        let hour: u8 = hour
            .trim()
            .parse()
            .map_err(|_| SlotParseError::Format(s.to_string()))?;

        if day >= DAYS_PER_WEEK {
            return Err(SlotParseError::DayOutOfRange(day));
        }
        if hour >= 24 {
            return Err(SlotParseError::HourOutOfRange(hour));
        }

        Ok(Slot { day, hour })
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a day given either as an index ("0".."6") or an English name.
/// Names match case-insensitively on any unambiguous prefix of 3+ letters.
pub fn parse_day(input: &str) -> Option<u8> {
    if let Ok(index) = input.parse::<u8>() {
        return (index < DAYS_PER_WEEK).then_some(index);
    }

    let needle = input.to_lowercase();
    if needle.len() < 3 {
        return None;
    }

    DAY_NAMES
        .iter()
        .position(|name| name.to_lowercase().starts_with(&needle))
        .map(|i| i as u8)
}

/// A recurring weekly unavailability constraint. Independent of task
/// placement; an absent entry means the slot is open.
#[derive(Serialize, Deserialize, Default, Clone)]
pub struct ScheduleSlot {
    /// UUID of the constraint entry
    pub id: Uuid,
    /// Day index, 0 = Monday .. 6 = Sunday
    pub day: u8,
    /// Hour of day, 0..=23
    pub hour: u8,
    /// Whether the slot is unavailable for placement
    pub is_blocked: bool,
}

impl ScheduleSlot {
    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            hour: self.hour,
        }
    }
}
