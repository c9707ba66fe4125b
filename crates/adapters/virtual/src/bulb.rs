//! Virtual bulb — an in-memory light with simulation hooks.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use kelvin_app::ports::{Bulb, BulbStatus};
use kelvin_domain::error::BulbError;
use kelvin_domain::light_state::{LightState, Tolerance};

use crate::error::VirtualBulbError;

const MIRED_SCALE: u32 = 1_000_000;

#[derive(Debug)]
struct State {
    reachable: bool,
    on: bool,
    /// What the bulb actually shows right now.
    live: LightState,
    /// What the last refresh (or write) reported.
    cached: LightState,
    last_written: Option<LightState>,
    fail_writes: bool,
    write_count: usize,
}

/// A simulated bulb.
///
/// Colour temperature goes through a mired round trip on every write, so
/// reading back a written state is close to, not equal to, what was sent.
#[derive(Debug)]
pub struct VirtualBulb {
    tolerance: Tolerance,
    state: Mutex<State>,
}

impl VirtualBulb {
    /// A reachable, switched on bulb showing `live`.
    #[must_use]
    pub fn new(live: LightState) -> Self {
        Self {
            tolerance: Tolerance::default(),
            state: Mutex::new(State {
                reachable: true,
                on: true,
                live,
                cached: live,
                last_written: None,
                fail_writes: false,
                write_count: 0,
            }),
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Simulate the bulb dropping off (or back onto) the network.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock_state().reachable = reachable;
    }

    /// Simulate someone flipping the wall switch.
    pub fn set_on(&self, on: bool) {
        self.lock_state().on = on;
    }

    /// Simulate a manual change from another app. Ignored fields keep their
    /// current value.
    pub fn adjust(&self, state: LightState) {
        let mut guard = self.lock_state();
        guard.live = merge(guard.live, state);
    }

    /// Make every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.lock_state().fail_writes = fail;
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock_state().write_count
    }

    /// What the bulb currently shows.
    #[must_use]
    pub fn live_state(&self) -> LightState {
        self.lock_state().live
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, target: LightState) -> Result<(), VirtualBulbError> {
        let mut state = self.lock_state();
        if !state.reachable {
            return Err(VirtualBulbError::Offline);
        }
        if state.fail_writes {
            return Err(VirtualBulbError::WriteRejected);
        }
        let stored = LightState::new(
            target.color_temperature.map(through_mireds),
            target.brightness,
        );
        state.live = merge(state.live, stored);
        state.cached = state.live;
        state.last_written = Some(target);
        state.write_count += 1;
        tracing::debug!(state = %state.live, "virtual bulb written");
        Ok(())
    }
}

impl Bulb for VirtualBulb {
    fn refresh(&self) -> impl Future<Output = Result<BulbStatus, BulbError>> + Send {
        let result: Result<BulbStatus, BulbError> = {
            let mut state = self.lock_state();
            if state.reachable {
                state.cached = state.live;
                Ok(BulbStatus {
                    reachable: true,
                    on: state.on,
                })
            } else {
                Err(VirtualBulbError::Offline.into())
            }
        };
        async move { result }
    }

    fn has_state(&self, target: LightState) -> bool {
        target.matches(&self.lock_state().cached, self.tolerance)
    }

    fn has_changed(&self) -> bool {
        let state = self.lock_state();
        state
            .last_written
            .is_some_and(|written| !written.matches(&state.cached, self.tolerance))
    }

    fn set_state(&self, target: LightState) -> impl Future<Output = Result<(), BulbError>> + Send {
        let result = self
            .write(target)
            .map_err(VirtualBulbError::into_write_failed);
        async move { result }
    }
}

fn merge(current: LightState, change: LightState) -> LightState {
    LightState::new(
        change.color_temperature.or(current.color_temperature),
        change.brightness.or(current.brightness),
    )
}

/// Kelvin to mireds and back, rounding at each step.
fn through_mireds(kelvin: u16) -> u16 {
    let kelvin = u32::from(kelvin.max(1));
    let mired = (MIRED_SCALE + kelvin / 2) / kelvin;
    let back = (MIRED_SCALE + mired / 2) / mired.max(1);
    u16::try_from(back).unwrap_or(u16::MAX)
}
