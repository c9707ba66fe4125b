//! In-process light event bus.
//!
//! Every [`LightService`](crate::services::LightService) publishes here; the
//! event logger and each SSE client hold their own receiver.

use std::future::Future;

use tokio::sync::broadcast;

use kelvin_domain::error::KelvinError;
use kelvin_domain::event::LightEvent;

use crate::ports::EventPublisher;

/// Fan-out of [`LightEvent`]s over a tokio [`broadcast`] channel.
///
/// A receiver that falls more than `capacity` events behind gets
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub struct InProcessEventBus {
    sender: broadcast::Sender<LightEvent>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LightEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: LightEvent) -> impl Future<Output = Result<(), KelvinError>> + Send {
        // nobody listening is not an error
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}
