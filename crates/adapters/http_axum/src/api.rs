//! JSON API and event stream handlers.

#[allow(clippy::missing_errors_doc)]
pub mod lights;
pub mod sse;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lights", get(lights::list))
        .route("/lights/{id}", get(lights::get))
        .route("/events/stream", get(sse::stream))
}
