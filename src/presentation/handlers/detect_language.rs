use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::domain::Method;
use crate::presentation::state::AppState;

use super::error::{error_response, service_error_response};
use super::upload::read_audio_upload;

#[derive(Debug, Deserialize)]
pub struct DetectLanguageQuery {
    pub method: Option<String>,
    pub encode: Option<bool>,
}

#[tracing::instrument(skip(state, query, multipart))]
pub async fn detect_language_handler(
    State(state): State<AppState>,
    Query(query): Query<DetectLanguageQuery>,
    mut multipart: Multipart,
) -> Response {
    let method = match query.method.as_deref().map(str::parse::<Method>) {
        Some(Ok(m)) => m,
        Some(Err(e)) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        None => Method::default(),
    };

    let upload = match read_audio_upload(&mut multipart).await {
        Ok(u) => u,
        Err(response) => return response,
    };

    match state
        .transcription_service
        .detect_language(upload.data, method, query.encode.unwrap_or(true))
        .await
    {
        Ok(detection) => (StatusCode::OK, Json(detection)).into_response(),
        Err(e) => service_error_response(e),
    }
}
