use std::sync::Arc;

use candle_transformers::models::whisper as m;

use crate::application::ports::{
    BackendOutput, InferenceBackend, InferenceError, SegmentStream, TranscribeOptions,
};
use crate::domain::Method;

use super::whisper_model::{WhisperModel, WindowDecoder};

/// Streaming engine: segments are decoded lazily as the caller pulls them,
/// and windows that are effectively silent are skipped.
pub struct StreamingWhisperEngine {
    model_name: String,
    model: Arc<WhisperModel>,
}

impl StreamingWhisperEngine {
    pub fn new(model_name: impl Into<String>, model: Arc<WhisperModel>) -> Self {
        Self {
            model_name: model_name.into(),
            model,
        }
    }
}

impl InferenceBackend for StreamingWhisperEngine {
    fn method(&self) -> Method {
        Method::Streaming
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn uses_gpu(&self) -> bool {
        self.model.uses_gpu()
    }

    fn transcribe(
        &self,
        waveform: Arc<[f32]>,
        options: &TranscribeOptions,
    ) -> Result<BackendOutput, InferenceError> {
        let (language, request) = self.model.window_request(&waveform, options)?;
        let duration = waveform.len() as f64 / m::SAMPLE_RATE as f64;

        tracing::debug!(
            model = %self.model_name,
            duration,
            language = %language,
            "Starting streaming transcription"
        );

        let decoder = WindowDecoder::new(Arc::clone(&self.model), waveform, request, true);
        Ok(BackendOutput::Streaming(SegmentStream::new(
            language,
            Some(duration),
            decoder,
        )))
    }

    fn detect_language(&self, waveform: &[f32]) -> Result<String, InferenceError> {
        if waveform.is_empty() {
            return Ok("en".to_string());
        }
        self.model.detect_language(waveform)
    }
}
