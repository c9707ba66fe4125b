//! JSON handlers for light status.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use kelvin_domain::error::{KelvinError, ValidationError};
use kelvin_domain::id::LightId;
use kelvin_domain::light::LightStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<LightStatus>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<LightStatus>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/lights`
pub async fn list(State(state): State<AppState>) -> ListResponse {
    ListResponse::Ok(Json(state.board.all()))
}

/// `GET /api/lights/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let light_id = LightId::from_str(&id)
        .map_err(|_| KelvinError::from(ValidationError::InvalidLightId(id)))?;
    let status = state.board.get(light_id)?;
    Ok(GetResponse::Ok(Json(status)))
}
