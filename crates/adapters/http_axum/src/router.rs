//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use kelvin_app::event_bus::InProcessEventBus;
    use kelvin_app::status_board::StatusBoard;
    use kelvin_domain::id::LightId;
    use kelvin_domain::light::Light;

    use super::*;

    fn app() -> Router {
        let board = StatusBoard::new();
        board.publish(vec![
            Light::new(LightId::new(1), "Desk").status(),
            Light::new(LightId::new(2), "Hall").status(),
        ]);
        build(AppState::new(board, Arc::new(InProcessEventBus::new(16))))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn should_return_ok_on_health_check() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_list_lights() {
        let (status, json) = get("/api/lights").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["name"], "Desk");
        assert_eq!(json[0]["phase"], "unscheduled");
    }

    #[tokio::test]
    async fn should_get_light_by_id() {
        let (status, json) = get("/api/lights/2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], 2);
        assert_eq!(json["name"], "Hall");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_light() {
        let (status, json) = get("/api/lights/7").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Light 7 not found");
    }

    #[tokio::test]
    async fn should_return_bad_request_for_malformed_id() {
        let (status, _) = get("/api/lights/desk").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_route() {
        let (status, _) = get("/api/nothing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
