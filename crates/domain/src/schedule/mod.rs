//! Schedule — one day's ordered list of intervals.
//!
//! A [`Schedule`] is built fresh every day from a [`ScheduleDefinition`]
//! and that day's [`SunTimes`]. Lights only ever query it.

mod definition;
mod interval;

pub use definition::{ScheduleDefinition, TimedLightState};
pub use interval::Interval;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{NoActiveIntervalError, ValidationError};
use crate::time::Timestamp;

/// Sunrise and sunset of one day, supplied by an external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SunTimes {
    #[serde(with = "crate::time::hhmm")]
    pub sunrise: NaiveTime,
    #[serde(with = "crate::time::hhmm")]
    pub sunset: NaiveTime,
}

impl SunTimes {
    /// # Errors
    ///
    /// Returns [`ValidationError::SunriseAfterSunset`] unless `sunrise < sunset`.
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Result<Self, ValidationError> {
        if sunrise >= sunset {
            return Err(ValidationError::SunriseAfterSunset { sunrise, sunset });
        }
        Ok(Self { sunrise, sunset })
    }
}

/// A day's plan: ordered, non-overlapping intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub name: String,
    #[serde(with = "crate::time::hhmm")]
    pub sunrise: NaiveTime,
    #[serde(with = "crate::time::hhmm")]
    pub sunset: NaiveTime,
    pub end_of_day: NaiveDate,
    pub enable_when_lights_appear: bool,
    intervals: Vec<Interval>,
}

impl Schedule {
    /// Build a schedule after checking that intervals are ordered and disjoint.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] or
    /// [`ValidationError::OverlappingIntervals`].
    pub fn new(
        name: impl Into<String>,
        sun: SunTimes,
        end_of_day: NaiveDate,
        enable_when_lights_appear: bool,
        intervals: Vec<Interval>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        for pair in intervals.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(ValidationError::OverlappingIntervals {
                    previous_end: pair[0].end,
                    start: pair[1].start,
                });
            }
        }
        Ok(Self {
            name,
            sunrise: sun.sunrise,
            sunset: sun.sunset,
            end_of_day,
            enable_when_lights_appear,
            intervals,
        })
    }

    /// The intervals, ordered by start time.
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Find the interval whose `[start, end)` contains `now`.
    ///
    /// # Errors
    ///
    /// Returns [`NoActiveIntervalError`] when `now` falls before the first
    /// interval, after the last one, or into a gap between two.
    pub fn current_interval(&self, now: NaiveTime) -> Result<&Interval, NoActiveIntervalError> {
        let idx = self.intervals.partition_point(|interval| interval.start <= now);
        idx.checked_sub(1)
            .map(|i| &self.intervals[i])
            .filter(|interval| interval.contains(now))
            .ok_or(NoActiveIntervalError { at: now })
    }

    /// Whether the day this schedule was built for is over.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.date() > self.end_of_day
    }
}
