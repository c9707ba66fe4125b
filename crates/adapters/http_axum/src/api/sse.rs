//! Server-Sent Events (SSE) stream of light events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// `GET /api/events/stream` — SSE stream of light events.
///
/// Each event is sent as a JSON `data:` frame with its kind as the SSE
/// event name. The stream continues until the client disconnects or the
/// event bus is closed.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match Event::default().event(event.kind.name()).json_data(&event) {
            Ok(frame) => Some(Ok(frame)),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(
                skipped = n,
                "SSE subscriber lagged, some events were dropped"
            );
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kelvin_app::event_bus::InProcessEventBus;
    use kelvin_app::ports::EventPublisher;
    use kelvin_app::status_board::StatusBoard;
    use kelvin_domain::event::{LightEvent, LightEventKind};
    use kelvin_domain::id::LightId;

    use super::*;

    #[tokio::test]
    async fn should_subscribe_to_event_bus_when_stream_created() {
        let event_bus = Arc::new(InProcessEventBus::new(16));
        let state = AppState::new(StatusBoard::new(), Arc::clone(&event_bus));
        let mut rx = event_bus.subscribe();

        let _sse_response = stream(State(state)).await;

        let event = LightEvent::new(
            LightId::new(1),
            "Desk",
            LightEventKind::Appeared,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        let event_id = event.id;
        event_bus.publish(event).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, event_id);
    }
}
