//! Event logger — renders light events through `tracing`.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use kelvin_domain::event::LightEvent;

/// Log every event received on `events` until the bus closes.
pub async fn run(mut events: broadcast::Receiver<LightEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => log(&event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged, some events were dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Log one event: transitions at `INFO`, schedule bookkeeping at `DEBUG`.
pub fn log(event: &LightEvent) {
    if event.kind.is_transition() {
        tracing::info!(
            light_id = %event.light_id,
            light = %event.light_name,
            "{}",
            event.kind
        );
    } else {
        tracing::debug!(
            light_id = %event.light_id,
            light = %event.light_name,
            "{}",
            event.kind
        );
    }
}
