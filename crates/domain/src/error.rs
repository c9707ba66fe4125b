//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`KelvinError`]
//! via `#[from]`.

use chrono::NaiveTime;

/// Top-level error returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum KelvinError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("no active interval")]
    NoActiveInterval(#[from] NoActiveIntervalError),

    #[error("bulb error")]
    Bulb(#[from] BulbError),
}

/// Domain invariant violations and malformed identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("interval {start} - {end} must end after it starts")]
    EmptyInterval { start: NaiveTime, end: NaiveTime },

    #[error("interval {start} - {end} mixes an ignored {field} with a concrete value")]
    MisconfiguredInterval {
        start: NaiveTime,
        end: NaiveTime,
        field: &'static str,
    },

    #[error("interval starting at {start} overlaps the previous interval ending at {previous_end}")]
    OverlappingIntervals {
        previous_end: NaiveTime,
        start: NaiveTime,
    },

    #[error("sunrise {sunrise} must be before sunset {sunset}")]
    SunriseAfterSunset {
        sunrise: NaiveTime,
        sunset: NaiveTime,
    },

    #[error("color temperature {0}K is out of range")]
    ColorTemperatureOutOfRange(u16),

    #[error("brightness {0}% is out of range")]
    BrightnessOutOfRange(u8),

    #[error("invalid light id {0:?}")]
    InvalidLightId(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The queried time falls outside every interval of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no interval is active at {at}")]
pub struct NoActiveIntervalError {
    pub at: NaiveTime,
}

/// Failures reported by a bulb adapter.
#[derive(Debug, thiserror::Error)]
pub enum BulbError {
    /// The bulb could not be read. Routine (bulb asleep, WiFi off).
    #[error("bulb unreachable")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Writing the target state failed.
    #[error("failed to write bulb state")]
    WriteFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}
