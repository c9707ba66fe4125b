//! Bulb port — reading and writing one physical light.
//!
//! Implementations own the network connection and its timeouts. A timed out
//! request is reported as an error like any other failure.

use std::future::Future;
use std::sync::Arc;

use kelvin_domain::error::BulbError;
use kelvin_domain::light_state::LightState;

/// Reachability and power state read from a bulb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulbStatus {
    pub reachable: bool,
    pub on: bool,
}

/// A single light as seen over the network.
///
/// `has_state` and `has_changed` answer from the state cached by the last
/// [`refresh`](Self::refresh); they never perform IO.
pub trait Bulb {
    /// Re-read the live state.
    ///
    /// Returns [`BulbError::Unreachable`] when the bulb could not be read.
    fn refresh(&self) -> impl Future<Output = Result<BulbStatus, BulbError>> + Send;

    /// Whether the live state matches `target` within the adapter's
    /// tolerance. Ignored fields of `target` always match.
    fn has_state(&self, target: LightState) -> bool;

    /// Whether the live state diverged from the last state written through
    /// [`set_state`](Self::set_state). `false` before the first write.
    fn has_changed(&self) -> bool;

    /// Write `target`, leaving ignored fields untouched.
    ///
    /// Returns [`BulbError::WriteFailed`] when the write did not go through.
    fn set_state(&self, target: LightState) -> impl Future<Output = Result<(), BulbError>> + Send;
}

impl<T: Bulb + Send + Sync> Bulb for Arc<T> {
    fn refresh(&self) -> impl Future<Output = Result<BulbStatus, BulbError>> + Send {
        (**self).refresh()
    }

    fn has_state(&self, target: LightState) -> bool {
        (**self).has_state(target)
    }

    fn has_changed(&self) -> bool {
        (**self).has_changed()
    }

    fn set_state(&self, target: LightState) -> impl Future<Output = Result<(), BulbError>> + Send {
        (**self).set_state(target)
    }
}
