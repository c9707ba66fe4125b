//! Event — an immutable record of something that happened to a light.
//!
//! The domain never logs. It reports what changed as [`LightEventKind`]s and
//! leaves rendering to whoever subscribes to the event bus.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::id::{EventId, LightId};
use crate::light_state::LightState;
use crate::schedule::Interval;
use crate::time::Timestamp;

/// Why a tracked light stopped being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceReason {
    Unreachable,
    TurnedOff,
}

impl fmt::Display for AbsenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => f.write_str("unreachable"),
            Self::TurnedOff => f.write_str("turned off"),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightEventKind {
    ScheduleAttached {
        schedule: String,
        date: NaiveDate,
        #[serde(with = "crate::time::hhmm")]
        sunrise: NaiveTime,
        #[serde(with = "crate::time::hhmm")]
        sunset: NaiveTime,
    },
    IntervalActivated {
        interval: Interval,
    },
    NoActiveInterval,
    TargetInitialized {
        state: LightState,
    },
    TargetUpdated {
        from: LightState,
        to: LightState,
    },
    Appeared,
    Disappeared {
        reason: AbsenceReason,
    },
    /// Automation took over a light as soon as it appeared.
    Initialized {
        state: LightState,
    },
    /// Automation took over because the live state matched the target.
    Claimed {
        state: LightState,
    },
    /// Someone changed the light by hand; automation stepped back.
    ManualOverride {
        /// Seconds between the light appearing and the manual change.
        after_secs: Option<i64>,
    },
    Updated {
        state: LightState,
    },
    WriteFailed {
        error: String,
    },
}

impl LightEventKind {
    /// Whether this event changes who controls the light or what it shows,
    /// as opposed to schedule bookkeeping.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        !matches!(
            self,
            Self::IntervalActivated { .. }
                | Self::NoActiveInterval
                | Self::TargetInitialized { .. }
                | Self::TargetUpdated { .. }
        )
    }

    /// The `type` tag this kind serializes with.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScheduleAttached { .. } => "schedule_attached",
            Self::IntervalActivated { .. } => "interval_activated",
            Self::NoActiveInterval => "no_active_interval",
            Self::TargetInitialized { .. } => "target_initialized",
            Self::TargetUpdated { .. } => "target_updated",
            Self::Appeared => "appeared",
            Self::Disappeared { .. } => "disappeared",
            Self::Initialized { .. } => "initialized",
            Self::Claimed { .. } => "claimed",
            Self::ManualOverride { .. } => "manual_override",
            Self::Updated { .. } => "updated",
            Self::WriteFailed { .. } => "write_failed",
        }
    }
}

impl fmt::Display for LightEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScheduleAttached {
                schedule,
                date,
                sunrise,
                sunset,
            } => write!(
                f,
                "activating schedule {schedule} for {date} (sunrise {}, sunset {})",
                sunrise.format("%H:%M"),
                sunset.format("%H:%M")
            ),
            Self::IntervalActivated { interval } => write!(f, "activating interval {interval}"),
            Self::NoActiveInterval => f.write_str("no active interval, idling"),
            Self::TargetInitialized { state } => write!(f, "target initialized to {state}"),
            Self::TargetUpdated { from, to } => write!(f, "target updated from {from} to {to}"),
            Self::Appeared => f.write_str("light appeared"),
            Self::Disappeared { reason } => write!(f, "light {reason}, clearing state"),
            Self::Initialized { state } => write!(f, "initialized to {state}"),
            Self::Claimed { state } => {
                write!(f, "live state matches target, taking control at {state}")
            }
            Self::ManualOverride { after_secs } => match after_secs {
                Some(secs) => write!(f, "changed manually after {secs}s, stepping back"),
                None => f.write_str("changed manually, stepping back"),
            },
            Self::Updated { state } => write!(f, "updated to {state}"),
            Self::WriteFailed { error } => write!(f, "write failed: {error}"),
        }
    }
}

/// A structured record of one light transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightEvent {
    pub id: EventId,
    pub light_id: LightId,
    pub light_name: String,
    pub kind: LightEventKind,
    pub at: Timestamp,
}

impl LightEvent {
    #[must_use]
    pub fn new(
        light_id: LightId,
        light_name: impl Into<String>,
        kind: LightEventKind,
        at: Timestamp,
    ) -> Self {
        Self {
            id: EventId::new(),
            light_id,
            light_name: light_name.into(),
            kind,
            at,
        }
    }
}
