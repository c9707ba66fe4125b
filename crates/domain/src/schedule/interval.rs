//! Interval — a contiguous window of a day with linearly interpolated light states.

use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;

use crate::error::ValidationError;
use crate::light_state::LightState;

/// A time window `[start, end)` whose light state moves linearly from
/// `start_state` to `end_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    #[serde(with = "crate::time::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::time::hhmm")]
    pub end: NaiveTime,
    pub start_state: LightState,
    pub end_state: LightState,
}

impl Interval {
    /// Build an interval after checking its invariants.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyInterval`] when `end <= start`
    /// - [`ValidationError::MisconfiguredInterval`] when one endpoint ignores
    ///   an attribute the other one sets
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        start_state: LightState,
        end_state: LightState,
    ) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyInterval { start, end });
        }
        if start_state.color_temperature.is_some() != end_state.color_temperature.is_some() {
            return Err(ValidationError::MisconfiguredInterval {
                start,
                end,
                field: "color temperature",
            });
        }
        if start_state.brightness.is_some() != end_state.brightness.is_some() {
            return Err(ValidationError::MisconfiguredInterval {
                start,
                end,
                field: "brightness",
            });
        }
        Ok(Self {
            start,
            end,
            start_state,
            end_state,
        })
    }

    /// Whether `now` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, now: NaiveTime) -> bool {
        self.start <= now && now < self.end
    }

    /// Interpolate the light state at `now`.
    ///
    /// Times before `start` or after `end` are clamped to the endpoints.
    #[must_use]
    pub fn calculate_light_state_in_interval(&self, now: NaiveTime) -> LightState {
        let progress = self.progress(now);
        LightState {
            color_temperature: self
                .start_state
                .color_temperature
                .zip(self.end_state.color_temperature)
                .map(|(from, to)| lerp_u16(from, to, progress)),
            brightness: self
                .start_state
                .brightness
                .zip(self.end_state.brightness)
                .map(|(from, to)| lerp_u8(from, to, progress)),
        }
    }

    /// Fraction of the interval elapsed at `now`, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    fn progress(&self, now: NaiveTime) -> f64 {
        if now <= self.start {
            return 0.0;
        }
        if now >= self.end {
            return 1.0;
        }
        let elapsed = (now - self.start).num_milliseconds();
        let total = (self.end - self.start).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_u16(from: u16, to: u16, progress: f64) -> u16 {
    let from = f64::from(from);
    let to = f64::from(to);
    (from + (to - from) * progress).round() as u16
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_u8(from: u8, to: u8, progress: f64) -> u8 {
    let from = f64::from(from);
    let to = f64::from(to);
    (from + (to - from) * progress).round() as u8
}
