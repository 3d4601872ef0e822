use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LoadError;
use crate::application::services::{RegistryError, TranscriptionServiceError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Decode failures are the client's fault; a model that cannot be found is 404;
/// everything else is a server failure.
pub fn service_error_status(error: &TranscriptionServiceError) -> StatusCode {
    match error {
        TranscriptionServiceError::Decode(_) => StatusCode::BAD_REQUEST,
        TranscriptionServiceError::Registry(RegistryError::Load(LoadError::ModelNotFound(_))) => {
            StatusCode::NOT_FOUND
        }
        TranscriptionServiceError::Registry(_)
        | TranscriptionServiceError::Inference(_)
        | TranscriptionServiceError::Timer(_)
        | TranscriptionServiceError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn service_error_response(error: TranscriptionServiceError) -> Response {
    let status = service_error_status(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::warn!(error = %error, status = %status, "Request rejected");
    }
    error_response(status, error.to_string())
}
