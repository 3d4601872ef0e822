use axum::http::StatusCode;

use whisper_asr::application::ports::{DecodeError, InferenceError, LoadError};
use whisper_asr::application::services::{RegistryError, TranscriptionServiceError};
use whisper_asr::presentation::handlers::service_error_status;

#[test]
fn given_decode_error_when_mapping_then_bad_request() {
    let error = TranscriptionServiceError::Decode(DecodeError::DecodingFailed("x".into()));

    assert_eq!(service_error_status(&error), StatusCode::BAD_REQUEST);
}

#[test]
fn given_missing_model_when_mapping_then_not_found() {
    let error = TranscriptionServiceError::Registry(RegistryError::Load(
        LoadError::ModelNotFound("large-v3".into()),
    ));

    assert_eq!(service_error_status(&error), StatusCode::NOT_FOUND);
}

#[test]
fn given_conversion_failure_when_mapping_then_internal_error() {
    let error = TranscriptionServiceError::Registry(RegistryError::Load(
        LoadError::ConversionFailed("bad weights".into()),
    ));

    assert_eq!(service_error_status(&error), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn given_inference_failure_when_mapping_then_internal_error() {
    let error =
        TranscriptionServiceError::Inference(InferenceError::TranscriptionFailed("oom".into()));

    assert_eq!(service_error_status(&error), StatusCode::INTERNAL_SERVER_ERROR);
}
