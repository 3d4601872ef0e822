use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::domain::ModelName;
use crate::presentation::state::AppState;

use super::error::{error_response, service_error_response};

#[derive(Debug, Deserialize)]
pub struct ChangeModelQuery {
    pub model: Option<String>,
}

#[tracing::instrument(skip(state))]
pub async fn change_model_handler(
    State(state): State<AppState>,
    Query(query): Query<ChangeModelQuery>,
) -> Response {
    let Some(requested) = query.model else {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Missing query parameter 'model'",
        );
    };

    let model = match requested.parse::<ModelName>() {
        Ok(m) => m,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    match state.transcription_service.change_model(&model).await {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(e) => service_error_response(e),
    }
}
