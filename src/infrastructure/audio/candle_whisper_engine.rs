use std::sync::Arc;

use candle_transformers::models::whisper as m;

use crate::application::ports::{
    BackendOutput, CompleteTranscript, InferenceBackend, InferenceError, TranscribeOptions,
};
use crate::domain::Method;

use super::whisper_model::{WhisperModel, WindowDecoder};

/// Reference engine: decodes every window before returning.
pub struct CandleWhisperEngine {
    model_name: String,
    model: Arc<WhisperModel>,
}

impl CandleWhisperEngine {
    pub fn new(model_name: impl Into<String>, model: Arc<WhisperModel>) -> Self {
        Self {
            model_name: model_name.into(),
            model,
        }
    }
}

impl InferenceBackend for CandleWhisperEngine {
    fn method(&self) -> Method {
        Method::Reference
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

        tracing::debug!(
            model = %self.model_name,
            samples = waveform.len(),
            language = %language,
            task = ?options.task,
            "Starting reference transcription"
        );

        let decoder = WindowDecoder::new(Arc::clone(&self.model), waveform, request, false);
        let segments = decoder.collect::<Result<Vec<_>, _>>()?;
        let text = segments.iter().map(|s| s.text.as_str()).collect::<String>();

        Ok(BackendOutput::Complete(CompleteTranscript {
            language,
            segments,
            text,
            duration: None,
        }))
    }

    fn detect_language(&self, waveform: &[f32]) -> Result<String, InferenceError> {
        if waveform.is_empty() {
            return Ok("en".to_string());
        }
        let window = &waveform[..waveform.len().min(m::N_SAMPLES)];
        self.model.detect_language(window)
    }
}
