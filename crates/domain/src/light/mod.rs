//! Light — the per-light state machine.
//!
//! Every polling tick runs the same sequence against a [`Light`]:
//!
//! 1. [`Light::observe_presence`] with the bulb's freshly read reachability
//! 2. [`Light::refresh_interval`] and [`Light::refresh_target_state`]
//! 3. [`Light::decide`] with a [`BulbReading`] to pick an [`Outcome`]
//! 4. the caller performs the write the decision asks for (if any)
//! 5. [`Light::apply`] to commit the resulting state
//!
//! Steps 3 and 5 are pure: the bulb itself lives in the `app` crate.

mod decision;

pub use decision::{BulbReading, Decision, Outcome};

use serde::Serialize;

use crate::event::{AbsenceReason, LightEventKind};
use crate::id::LightId;
use crate::light_state::LightState;
use crate::schedule::{Interval, Schedule};
use crate::time::Timestamp;

/// Where a light stands, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightPhase {
    Unscheduled,
    Absent,
    JustAppeared,
    ManualOverride,
    Automatic,
    AutomaticStale,
}

/// A light kelvin can automate.
#[derive(Debug, Clone)]
pub struct Light {
    id: LightId,
    name: String,
    schedule: Option<Schedule>,
    tracking: bool,
    automatic: bool,
    stale: bool,
    reachable: bool,
    on: bool,
    target_light_state: Option<LightState>,
    interval: Option<Interval>,
    appearance: Option<Timestamp>,
}

impl Light {
    #[must_use]
    pub fn new(id: LightId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            schedule: None,
            tracking: false,
            automatic: false,
            stale: false,
            reachable: false,
            on: false,
            target_light_state: None,
            interval: None,
            appearance: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> LightId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    #[must_use]
    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[must_use]
    pub fn target_light_state(&self) -> Option<LightState> {
        self.target_light_state
    }

    #[must_use]
    pub fn interval(&self) -> Option<&Interval> {
        self.interval.as_ref()
    }

    #[must_use]
    pub fn appearance(&self) -> Option<Timestamp> {
        self.appearance
    }

    #[must_use]
    pub fn phase(&self) -> LightPhase {
        if !self.is_scheduled() {
            LightPhase::Unscheduled
        } else if !self.reachable || !self.on {
            LightPhase::Absent
        } else if !self.tracking {
            LightPhase::JustAppeared
        } else if !self.automatic {
            LightPhase::ManualOverride
        } else if self.stale {
            LightPhase::AutomaticStale
        } else {
            LightPhase::Automatic
        }
    }

    /// Record the reachability and power state the bulb just reported.
    pub fn observe_presence(&mut self, reachable: bool, on: bool) {
        self.reachable = reachable;
        self.on = on;
    }

    /// Replace the schedule and recompute interval and target for `now`.
    pub fn attach_schedule(&mut self, schedule: Schedule, now: Timestamp) -> Vec<LightEventKind> {
        let mut events = vec![LightEventKind::ScheduleAttached {
            schedule: schedule.name.clone(),
            date: schedule.end_of_day,
            sunrise: schedule.sunrise,
            sunset: schedule.sunset,
        }];
        self.schedule = Some(schedule);

        match self.refresh_interval(now) {
            Some(event) => events.push(event),
            None if self.interval.is_none() => events.push(LightEventKind::NoActiveInterval),
            None => {}
        }
        events.extend(self.refresh_target_state(now));
        events
    }

    /// Look up the interval active at `now`. Returns an event only when the
    /// active interval changed.
    pub fn refresh_interval(&mut self, now: Timestamp) -> Option<LightEventKind> {
        let schedule = self.schedule.as_ref()?;
        match schedule.current_interval(now.time()) {
            Ok(interval) if self.interval.as_ref() == Some(interval) => None,
            Ok(interval) => {
                self.interval = Some(*interval);
                Some(LightEventKind::IntervalActivated {
                    interval: *interval,
                })
            }
            Err(_) => self
                .interval
                .take()
                .map(|_| LightEventKind::NoActiveInterval),
        }
    }

    /// Interpolate the target for `now` from the active interval. Returns an
    /// event only when the target changed.
    ///
    /// Without an active interval the last known target is kept.
    pub fn refresh_target_state(&mut self, now: Timestamp) -> Option<LightEventKind> {
        let interval = self.interval.as_ref()?;
        let next = interval.calculate_light_state_in_interval(now.time());
        let previous = self.target_light_state.replace(next);
        match previous {
            Some(current) if current == next => None,
            Some(from) => {
                self.stale = true;
                Some(LightEventKind::TargetUpdated { from, to: next })
            }
            None => {
                self.stale = true;
                Some(LightEventKind::TargetInitialized { state: next })
            }
        }
    }

    /// Pick what this tick should do. Does not mutate the light.
    ///
    /// Rules are checked in order and the first match wins.
    #[must_use]
    pub fn decide(&self, reading: &BulbReading) -> Decision {
        let Some(schedule) = &self.schedule else {
            return Decision::settled(Outcome::Unscheduled);
        };
        if !self.reachable {
            return Decision::settled(self.absence(AbsenceReason::Unreachable));
        }
        if !self.on {
            return Decision::settled(self.absence(AbsenceReason::TurnedOff));
        }

        let target = self.target_light_state.filter(|state| !state.is_ignored());

        if !self.tracking {
            let outcome = match target {
                Some(state) if schedule.enable_when_lights_appear => Outcome::Initialize(state),
                _ => Self::match_target(target, reading),
            };
            return Decision {
                appeared: true,
                outcome,
            };
        }

        if !self.automatic {
            return Decision::settled(Self::match_target(target, reading));
        }

        if reading.changed_externally {
            return Decision::settled(Outcome::Override);
        }

        match target {
            Some(state) if !reading.matches_target => Decision::settled(Outcome::Update(state)),
            _ => Decision::settled(Outcome::InSync),
        }
    }

    /// Commit a decision. `written` tells whether the write the decision asked
    /// for went through; it is ignored for decisions without a write.
    pub fn apply(
        &mut self,
        decision: &Decision,
        now: Timestamp,
        written: bool,
    ) -> Vec<LightEventKind> {
        let mut events = Vec::new();
        if decision.appeared {
            self.tracking = true;
            self.appearance = Some(now);
            events.push(LightEventKind::Appeared);
        }

        match decision.outcome {
            Outcome::Disappeared(reason) => {
                self.tracking = false;
                self.automatic = false;
                events.push(LightEventKind::Disappeared { reason });
            }
            Outcome::Initialize(state) if written => {
                self.automatic = true;
                self.stale = false;
                events.push(LightEventKind::Initialized { state });
            }
            Outcome::Claim(state) if written => {
                self.automatic = true;
                self.stale = false;
                events.push(LightEventKind::Claimed { state });
            }
            Outcome::Update(state) if written => {
                self.stale = false;
                events.push(LightEventKind::Updated { state });
            }
            Outcome::Update(_) => self.stale = true,
            Outcome::Override => {
                self.automatic = false;
                events.push(LightEventKind::ManualOverride {
                    after_secs: self.appearance.map(|at| (now - at).num_seconds()),
                });
            }
            Outcome::InSync => self.stale = false,
            _ => {}
        }
        events
    }

    /// A serializable snapshot for status reports.
    #[must_use]
    pub fn status(&self) -> LightStatus {
        LightStatus {
            id: self.id,
            name: self.name.clone(),
            schedule: self.schedule.as_ref().map(|s| s.name.clone()),
            scheduled: self.is_scheduled(),
            reachable: self.reachable,
            on: self.on,
            tracking: self.tracking,
            automatic: self.automatic,
            phase: self.phase(),
            target_light_state: self.target_light_state,
            interval: self.interval,
            appearance: self.appearance,
        }
    }

    fn absence(&self, reason: AbsenceReason) -> Outcome {
        if self.tracking {
            Outcome::Disappeared(reason)
        } else {
            Outcome::Absent
        }
    }

    fn match_target(target: Option<LightState>, reading: &BulbReading) -> Outcome {
        match target {
            None => Outcome::Ignore,
            Some(state) if reading.matches_target => Outcome::Claim(state),
            Some(_) => Outcome::StandBy,
        }
    }
}

/// Point-in-time view of a [`Light`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightStatus {
    pub id: LightId,
    pub name: String,
    pub schedule: Option<String>,
    pub scheduled: bool,
    pub reachable: bool,
    pub on: bool,
    pub tracking: bool,
    pub automatic: bool,
    pub phase: LightPhase,
    pub target_light_state: Option<LightState>,
    pub interval: Option<Interval>,
    pub appearance: Option<Timestamp>,
}
