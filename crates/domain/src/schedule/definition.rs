//! Schedule definition — the configured day plan a [`Schedule`] is built from.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{Interval, Schedule, SunTimes};
use crate::error::ValidationError;
use crate::id::LightId;
use crate::light_state::LightState;

/// A light state pinned to a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedLightState {
    #[serde(with = "crate::time::hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub color_temperature: Option<u16>,
    #[serde(default)]
    pub brightness: Option<u8>,
}

impl TimedLightState {
    #[must_use]
    pub fn state(&self) -> LightState {
        LightState::new(self.color_temperature, self.brightness)
    }
}

/// A named day plan and the lights it drives.
///
/// Between sunrise and sunset the lights hold the daytime default; the
/// timed points before sunrise and after sunset shape the night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDefinition {
    pub name: String,
    /// Lights driven by this schedule. Empty means "every light".
    pub lights: Vec<LightId>,
    /// Take control of lights as soon as they are switched on.
    pub enable_when_lights_appear: bool,
    pub default_color_temperature: Option<u16>,
    pub default_brightness: Option<u8>,
    pub before_sunrise: Vec<TimedLightState>,
    pub after_sunset: Vec<TimedLightState>,
}

impl Default for ScheduleDefinition {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            lights: Vec::new(),
            enable_when_lights_appear: false,
            default_color_temperature: Some(2750),
            default_brightness: Some(100),
            before_sunrise: vec![point(4, 0, 2000, 60)],
            after_sunset: vec![point(20, 0, 2700, 80), point(22, 30, 2000, 60)],
        }
    }
}

fn point(hour: u32, minute: u32, color_temperature: u16, brightness: u8) -> TimedLightState {
    TimedLightState {
        time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
        color_temperature: Some(color_temperature),
        brightness: Some(brightness),
    }
}

impl ScheduleDefinition {
    /// The daytime state held between sunrise and sunset.
    #[must_use]
    pub fn daytime_state(&self) -> LightState {
        LightState::new(self.default_color_temperature, self.default_brightness)
    }

    /// Whether this definition drives the given light.
    #[must_use]
    pub fn applies_to(&self, light: LightId) -> bool {
        self.lights.is_empty() || self.lights.contains(&light)
    }

    /// Check every configured state.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] or the first out-of-range state.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.daytime_state().validate()?;
        self.before_sunrise
            .iter()
            .chain(&self.after_sunset)
            .try_for_each(|p| p.state().validate())
    }

    /// Turn the definition into the schedule for `date`.
    ///
    /// Points before sunrise that are not earlier than sunrise (and points
    /// after sunset that are not later than sunset) are dropped: sun times
    /// move through the year, the configured clock times do not.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the definition is invalid or two
    /// neighbouring points disagree on which attributes they ignore.
    pub fn build(&self, date: NaiveDate, sun: SunTimes) -> Result<Schedule, ValidationError> {
        self.validate()?;

        let mut before = self.before_sunrise.clone();
        before.sort_by_key(|p| p.time);
        before.retain(|p| p.time < sun.sunrise);

        let mut after = self.after_sunset.clone();
        after.sort_by_key(|p| p.time);
        after.retain(|p| p.time > sun.sunset);

        let day = self.daytime_state();
        let night = after.last().map_or(day, TimedLightState::state);

        let mut points = Vec::with_capacity(before.len() + after.len() + 4);
        points.push((NaiveTime::MIN, night));
        points.extend(before.iter().map(|p| (p.time, p.state())));
        points.push((sun.sunrise, day));
        points.push((sun.sunset, day));
        points.extend(after.iter().map(|p| (p.time, p.state())));
        points.push((end_of_day(), night));

        let intervals = points
            .windows(2)
            .filter(|pair| pair[0].0 < pair[1].0)
            .map(|pair| Interval::new(pair[0].0, pair[1].0, pair[0].1, pair[1].1))
            .collect::<Result<Vec<_>, _>>()?;

        Schedule::new(
            self.name.clone(),
            sun,
            date,
            self.enable_when_lights_appear,
            intervals,
        )
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn sun(sunrise: NaiveTime, sunset: NaiveTime) -> SunTimes {
        SunTimes::new(sunrise, sunset).unwrap()
    }

    #[test]
    fn should_build_contiguous_day_from_default_definition() {
        let schedule = ScheduleDefinition::default()
            .build(day(), sun(at(6, 30), at(19, 30)))
            .unwrap();

        let bounds: Vec<_> = schedule
            .intervals()
            .iter()
            .map(|i| (i.start, i.end))
            .collect();
        assert_eq!(
            bounds,
            vec![
                (at(0, 0), at(4, 0)),
                (at(4, 0), at(6, 30)),
                (at(6, 30), at(19, 30)),
                (at(19, 30), at(20, 0)),
                (at(20, 0), at(22, 30)),
                (at(22, 30), end_of_day()),
            ]
        );
        assert_eq!(schedule.end_of_day, day());
    }

    #[test]
    fn should_hold_daytime_state_between_sunrise_and_sunset() {
        let schedule = ScheduleDefinition::default()
            .build(day(), sun(at(6, 30), at(19, 30)))
            .unwrap();
        let noon = schedule.current_interval(at(12, 0)).unwrap();
        assert_eq!(
            noon.calculate_light_state_in_interval(at(12, 0)),
            LightState::kelvin(2750, 100)
        );
    }

    #[test]
    fn should_interpolate_towards_sunrise() {
        let schedule = ScheduleDefinition::default()
            .build(day(), sun(at(6, 0), at(19, 30)))
            .unwrap();
        let dawn = schedule.current_interval(at(5, 0)).unwrap();
        assert_eq!(
            dawn.calculate_light_state_in_interval(at(5, 0)),
            LightState::kelvin(2375, 80)
        );
    }

    #[test]
    fn should_start_the_day_with_last_night_state() {
        let schedule = ScheduleDefinition::default()
            .build(day(), sun(at(6, 30), at(19, 30)))
            .unwrap();
        assert_eq!(
            schedule.intervals()[0].start_state,
            LightState::kelvin(2000, 60)
        );
    }

    #[test]
    fn should_drop_points_on_the_wrong_side_of_the_sun() {
        let schedule = ScheduleDefinition::default()
            .build(day(), sun(at(3, 30), at(21, 0)))
            .unwrap();
        let starts: Vec<_> = schedule.intervals().iter().map(|i| i.start).collect();
        assert_eq!(starts, vec![at(0, 0), at(3, 30), at(21, 0), at(22, 30)]);
    }

    #[test]
    fn should_fall_back_to_daytime_state_without_night_points() {
        let definition = ScheduleDefinition {
            before_sunrise: vec![],
            after_sunset: vec![],
            ..ScheduleDefinition::default()
        };
        let schedule = definition
            .build(day(), sun(at(6, 30), at(19, 30)))
            .unwrap();
        assert_eq!(schedule.intervals().len(), 3);
        assert_eq!(
            schedule.intervals()[0].start_state,
            LightState::kelvin(2750, 100)
        );
    }

    #[test]
    fn should_reject_points_mixing_ignored_and_concrete_fields() {
        let definition = ScheduleDefinition {
            after_sunset: vec![TimedLightState {
                time: at(21, 0),
                color_temperature: None,
                brightness: Some(40),
            }],
            ..ScheduleDefinition::default()
        };
        let result = definition.build(day(), sun(at(6, 30), at(19, 30)));
        assert!(matches!(
            result,
            Err(ValidationError::MisconfiguredInterval { .. })
        ));
    }

    #[test]
    fn should_build_fully_ignored_schedule() {
        let definition = ScheduleDefinition {
            default_color_temperature: None,
            default_brightness: None,
            before_sunrise: vec![],
            after_sunset: vec![],
            ..ScheduleDefinition::default()
        };
        let schedule = definition
            .build(day(), sun(at(6, 30), at(19, 30)))
            .unwrap();
        let noon = schedule.current_interval(at(12, 0)).unwrap();
        let state = noon.calculate_light_state_in_interval(at(12, 0));
        assert!(state.is_ignored());
    }

    #[test]
    fn should_reject_out_of_range_default() {
        let definition = ScheduleDefinition {
            default_brightness: Some(150),
            ..ScheduleDefinition::default()
        };
        assert_eq!(
            definition.validate(),
            Err(ValidationError::BrightnessOutOfRange(150))
        );
    }

    #[test]
    fn should_apply_to_every_light_when_list_is_empty() {
        let definition = ScheduleDefinition::default();
        assert!(definition.applies_to(LightId::new(7)));

        let scoped = ScheduleDefinition {
            lights: vec![LightId::new(1)],
            ..ScheduleDefinition::default()
        };
        assert!(scoped.applies_to(LightId::new(1)));
        assert!(!scoped.applies_to(LightId::new(7)));
    }

    #[test]
    fn should_deserialize_from_json_with_defaults() {
        let json = serde_json::json!({
            "name": "bedroom",
            "lights": [1, 2],
            "after_sunset": [{ "time": "21:00", "color_temperature": 2200, "brightness": 50 }]
        });
        let definition: ScheduleDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(definition.name, "bedroom");
        assert_eq!(definition.lights, vec![LightId::new(1), LightId::new(2)]);
        assert_eq!(definition.default_color_temperature, Some(2750));
        assert_eq!(definition.after_sunset[0].time, at(21, 0));
        assert!(definition.before_sunrise.len() == 1);
    }
}
