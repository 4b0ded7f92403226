//! Clock-time utilities: `HH:MM` wall-clock times within a single day.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

const LAST_MINUTE: i32 = 23 * 60 + 59;

/// Minutes since local midnight. Arithmetic saturates at 00:00 and 23:59 so a
/// window never wraps into the neighbouring day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self::from_naive)
    }

    /// Parse `HH:MM` (single-digit hours accepted), returning `None` on failure.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .ok()
            .map(Self::from_naive)
    }

    /// Strict variant of [`ClockTime::parse`] for user input.
    pub fn parse_input(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| EngineError::validation(format!("invalid clock time '{s}' (expected HH:MM)")))
    }

    fn from_naive(t: NaiveTime) -> Self {
        ClockTime((t.hour() * 60 + t.minute()) as u16)
    }

    pub fn minutes(self) -> i32 {
        self.0 as i32
    }

    pub fn from_minutes_saturating(minutes: i32) -> Self {
        ClockTime(minutes.clamp(0, LAST_MINUTE) as u16)
    }

    pub fn plus(self, minutes: i32) -> Self {
        Self::from_minutes_saturating(self.minutes() + minutes)
    }

    pub fn minus(self, minutes: i32) -> Self {
        Self::from_minutes_saturating(self.minutes() - minutes)
    }

    /// Signed minutes from `earlier` to `self`.
    pub fn minutes_since(self, earlier: ClockTime) -> i32 {
        self.minutes() - earlier.minutes()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClockTime::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid clock time '{s}'")))
    }
}
