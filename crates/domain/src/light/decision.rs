//! Decision — what one polling tick should do with a light.

use crate::event::AbsenceReason;
use crate::light_state::LightState;

/// What the bulb reported about its live state, relative to the light's target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulbReading {
    /// The live state matches the current target (within tolerance).
    pub matches_target: bool,
    /// The live state drifted from the last state kelvin itself wrote.
    pub changed_externally: bool,
}

/// The branch of the state machine a tick ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No schedule attached.
    Unscheduled,
    /// Unreachable or off, and already untracked.
    Absent,
    /// Was tracked, now unreachable or off.
    Disappeared(AbsenceReason),
    /// Just appeared and the schedule takes lights over on appearance.
    Initialize(LightState),
    /// Not automatic and the target ignores everything (or is not known yet).
    Ignore,
    /// Not automatic and the live state does not match the target.
    StandBy,
    /// Not automatic and the live state matches the target.
    Claim(LightState),
    /// Automatic, but a human changed the light.
    Override,
    /// Automatic and already showing the target.
    InSync,
    /// Automatic and behind the target.
    Update(LightState),
}

impl Outcome {
    /// The state to push to the bulb, if any.
    #[must_use]
    pub fn write(&self) -> Option<LightState> {
        match self {
            Self::Initialize(state) | Self::Claim(state) | Self::Update(state) => Some(*state),
            _ => None,
        }
    }
}

/// Result of [`Light::decide`](super::Light::decide).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// The light became present this tick.
    pub appeared: bool,
    pub outcome: Outcome,
}

impl Decision {
    pub(super) fn settled(outcome: Outcome) -> Self {
        Self {
            appeared: false,
            outcome,
        }
    }

    /// The state to push to the bulb, if any.
    #[must_use]
    pub fn write(&self) -> Option<LightState> {
        self.outcome.write()
    }
}
