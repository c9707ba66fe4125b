//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `kelvin.toml` in the working directory (or at `KELVIN_CONFIG`).
//! Every field has a sensible default so the file is optional. Environment
//! variables take precedence over file values.

use std::collections::HashSet;

use chrono::NaiveTime;
use serde::Deserialize;

use kelvin_adapter_virtual::VirtualBulb;
use kelvin_domain::error::ValidationError;
use kelvin_domain::id::LightId;
use kelvin_domain::light_state::LightState;
use kelvin_domain::schedule::{ScheduleDefinition, SunTimes};

const DEFAULT_PATH: &str = "kelvin.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// How often lights are polled.
    pub polling: PollingConfig,
    /// Fixed sunrise and sunset.
    pub sun: SunConfig,
    /// Schedule definitions; the first one that applies to a light wins.
    pub schedules: Vec<ScheduleDefinition>,
    /// Simulated bulbs.
    pub lights: Vec<LightConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

/// Sun times used for every day.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    #[serde(with = "kelvin_domain::time::hhmm")]
    pub sunrise: NaiveTime,
    #[serde(with = "kelvin_domain::time::hhmm")]
    pub sunset: NaiveTime,
}

/// A virtual bulb and its initial state.
#[derive(Debug, Clone, Deserialize)]
pub struct LightConfig {
    pub id: LightId,
    pub name: String,
    #[serde(default = "enabled")]
    pub reachable: bool,
    #[serde(default = "enabled")]
    pub on: bool,
    #[serde(default = "default_color_temperature")]
    pub color_temperature: u16,
    #[serde(default = "default_brightness")]
    pub brightness: u8,
}

impl Config {
    /// Load configuration from `kelvin.toml` (or `KELVIN_CONFIG`, if set)
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("KELVIN_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KELVIN_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("KELVIN_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("KELVIN_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("KELVIN_POLL_INTERVAL_SECS")
            && let Ok(secs) = val.parse()
        {
            self.polling.interval_secs = secs;
        }
        if let Ok(val) = std::env::var("KELVIN_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling interval must be non-zero".to_string(),
            ));
        }
        let sun = self.sun.sun_times()?;
        let today = kelvin_domain::time::now().date();
        for schedule in &self.schedules {
            schedule.build(today, sun)?;
        }
        let mut ids = HashSet::new();
        for light in &self.lights {
            if !ids.insert(light.id) {
                return Err(ConfigError::Validation(format!(
                    "light id {} is configured twice",
                    light.id
                )));
            }
            if light.name.is_empty() {
                return Err(ValidationError::EmptyName.into());
            }
            light.initial_state().validate()?;
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.polling.interval_secs)
    }
}

impl SunConfig {
    /// # Errors
    ///
    /// Returns an error unless sunrise comes before sunset.
    pub fn sun_times(&self) -> Result<SunTimes, ValidationError> {
        SunTimes::new(self.sunrise, self.sunset)
    }
}

impl LightConfig {
    #[must_use]
    pub fn initial_state(&self) -> LightState {
        LightState::kelvin(self.color_temperature, self.brightness)
    }

    /// Build the simulated bulb in its configured state.
    #[must_use]
    pub fn bulb(&self) -> VirtualBulb {
        let bulb = VirtualBulb::new(self.initial_state());
        bulb.set_reachable(self.reachable);
        bulb.set_on(self.on);
        bulb
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            polling: PollingConfig::default(),
            sun: SunConfig::default(),
            schedules: vec![ScheduleDefinition::default()],
            lights: vec![
                LightConfig::demo(1, "Desk", 2750),
                LightConfig::demo(2, "Hall", 4000),
            ],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "kelvind=info,kelvin_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 1 }
    }
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            sunrise: NaiveTime::from_hms_opt(6, 30, 0).unwrap_or(NaiveTime::MIN),
            sunset: NaiveTime::from_hms_opt(19, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl LightConfig {
    fn demo(id: u32, name: &str, color_temperature: u16) -> Self {
        Self {
            id: LightId::new(id),
            name: name.to_string(),
            reachable: true,
            on: true,
            color_temperature,
            brightness: default_brightness(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_color_temperature() -> u16 {
    2700
}

fn default_brightness() -> u8 {
    100
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.polling.interval_secs, 1);
        assert_eq!(config.sun.sunrise.to_string(), "06:30:00");
        assert_eq!(config.schedules.len(), 1);
        assert_eq!(config.lights.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.schedules[0].name, "default");
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [polling]
            interval_secs = 5

            [sun]
            sunrise = '07:15'
            sunset = '18:45'

            [[schedules]]
            name = 'living room'
            lights = [3]
            enable_when_lights_appear = true
            default_color_temperature = 3000
            before_sunrise = [{ time = '05:00', color_temperature = 2200, brightness = 40 }]
            after_sunset = [{ time = '21:00', brightness = 50 }]

            [[lights]]
            id = 3
            name = 'Sofa'
            on = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.poll_interval().as_secs(), 5);
        assert_eq!(config.sun.sunset.to_string(), "18:45:00");

        let schedule = &config.schedules[0];
        assert_eq!(schedule.name, "living room");
        assert!(schedule.applies_to(LightId::new(3)));
        assert!(!schedule.applies_to(LightId::new(1)));
        assert!(schedule.enable_when_lights_appear);
        assert_eq!(schedule.default_brightness, Some(100));
        assert_eq!(schedule.after_sunset[0].color_temperature, None);

        let light = &config.lights[0];
        assert_eq!(light.id, LightId::new(3));
        assert!(light.reachable);
        assert!(!light.on);
        assert_eq!(light.initial_state(), LightState::kelvin(2700, 100));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_sunset_before_sunrise() {
        let mut config = Config::default();
        config.sun.sunset = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_duplicate_light_ids() {
        let mut config = Config::default();
        config.lights.push(LightConfig::demo(1, "Twin", 2700));
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: light id 1 is configured twice"
        );
    }

    #[test]
    fn should_reject_out_of_range_light_state() {
        let mut config = Config::default();
        config.lights[0].brightness = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_invalid_schedule() {
        let mut config = Config::default();
        config.schedules[0].default_color_temperature = Some(20_000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_schedule_mixing_ignored_and_concrete_values() {
        let toml = "
            [[schedules]]
            name = 'dim only'
            after_sunset = [{ time = '21:00', brightness = 50 }]
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_custom_bind_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_report_parse_error_for_malformed_time() {
        let result: Result<Config, _> = toml::from_str("[sun]\nsunrise = 'dawn'\n");
        assert!(result.is_err());
    }

    #[test]
    fn should_build_bulb_in_configured_state() {
        let light = LightConfig::demo(1, "Desk", 3000);
        let bulb = light.bulb();
        assert_eq!(bulb.live_state(), LightState::kelvin(3000, 100));
    }
}
