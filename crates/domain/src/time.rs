//! Time and timestamp helpers.
//!
//! Schedules follow the wall clock of the place the lights are in, so every
//! timestamp in the domain is a local, naive date-time.

use chrono::{Local, NaiveDateTime};

/// Local wall-clock timestamp used for appearances, event times, etc.
pub type Timestamp = NaiveDateTime;

/// Return the current local time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now().naive_local()
}

/// Serde helpers for `HH:MM` (or `HH:MM:SS`) times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parse `HH:MM` or `HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error when neither format matches.
    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
