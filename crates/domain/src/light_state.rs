//! Light state — the color temperature and brightness a light should show.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest color temperature accepted in a schedule, in Kelvin.
pub const MIN_COLOR_TEMPERATURE: u16 = 1000;
/// Highest color temperature accepted in a schedule, in Kelvin.
pub const MAX_COLOR_TEMPERATURE: u16 = 6500;
/// Highest brightness, in percent.
pub const MAX_BRIGHTNESS: u8 = 100;

/// Color temperature and brightness of a light.
///
/// A `None` field means "leave this attribute alone": it is never written
/// and always matches whatever the bulb currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightState {
    /// Color temperature in Kelvin.
    pub color_temperature: Option<u16>,
    /// Brightness in percent (0–100).
    pub brightness: Option<u8>,
}

impl LightState {
    /// The state that ignores both attributes.
    pub const IGNORE: Self = Self {
        color_temperature: None,
        brightness: None,
    };

    #[must_use]
    pub const fn new(color_temperature: Option<u16>, brightness: Option<u8>) -> Self {
        Self {
            color_temperature,
            brightness,
        }
    }

    /// Shorthand for a state with both attributes set.
    #[must_use]
    pub const fn kelvin(color_temperature: u16, brightness: u8) -> Self {
        Self::new(Some(color_temperature), Some(brightness))
    }

    /// Whether both attributes are ignored.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.color_temperature.is_none() && self.brightness.is_none()
    }

    /// Whether `self` (a target) is matched by `live` within `tolerance`.
    ///
    /// Ignored attributes of the target always match.
    #[must_use]
    pub fn matches(&self, live: &Self, tolerance: Tolerance) -> bool {
        let color_ok = match (self.color_temperature, live.color_temperature) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(target), Some(actual)) => target.abs_diff(actual) <= tolerance.color_temperature,
        };
        let brightness_ok = match (self.brightness, live.brightness) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(target), Some(actual)) => target.abs_diff(actual) <= tolerance.brightness,
        };
        color_ok && brightness_ok
    }

    /// Check that every present attribute is within the supported range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ColorTemperatureOutOfRange`] or
    /// [`ValidationError::BrightnessOutOfRange`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ct) = self.color_temperature
            && !(MIN_COLOR_TEMPERATURE..=MAX_COLOR_TEMPERATURE).contains(&ct)
        {
            return Err(ValidationError::ColorTemperatureOutOfRange(ct));
        }
        if let Some(bri) = self.brightness
            && bri > MAX_BRIGHTNESS
        {
            return Err(ValidationError::BrightnessOutOfRange(bri));
        }
        Ok(())
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color_temperature {
            Some(ct) => write!(f, "{ct}K")?,
            None => f.write_str("-")?,
        }
        match self.brightness {
            Some(bri) => write!(f, " at {bri}%"),
            None => f.write_str(" at -"),
        }
    }
}

/// How far a live state may drift from a target and still count as equal.
///
/// Bulbs round what they are told (Hue stores mireds, not Kelvin), so an
/// exact comparison would flag every write as a manual change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Allowed difference in Kelvin.
    pub color_temperature: u16,
    /// Allowed difference in percent points.
    pub brightness: u8,
}

impl Tolerance {
    /// Exact comparison.
    pub const EXACT: Self = Self {
        color_temperature: 0,
        brightness: 0,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            color_temperature: 50,
            brightness: 1,
        }
    }
}
