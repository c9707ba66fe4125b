//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use kelvin_domain::error::KelvinError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`KelvinError`] to an HTTP response with appropriate status code.
pub struct ApiError(KelvinError);

impl From<KelvinError> for ApiError {
    fn from(err: KelvinError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            KelvinError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            KelvinError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            err => {
                tracing::error!(error = %err, "unexpected error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
