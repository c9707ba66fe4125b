//! Event bus port — where light events go once a tick has produced them.

use std::future::Future;

use kelvin_domain::error::KelvinError;
use kelvin_domain::event::LightEvent;

/// Sink for [`LightEvent`]s.
///
/// Implementations must not block the polling loop; a missing subscriber
/// is not an error.
pub trait EventPublisher {
    fn publish(&self, event: LightEvent) -> impl Future<Output = Result<(), KelvinError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: LightEvent) -> impl Future<Output = Result<(), KelvinError>> + Send {
        (**self).publish(event)
    }
}
