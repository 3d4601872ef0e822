use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{DecodeError, DecodedAudio, InferenceError, TranscribeOptions};
use crate::application::services::{
    AudioNormalizer, ModelChange, ModelRegistry, RegistryError, ResultAssembler, ResultMetadata,
    StepTimer, TimerError,
};
use crate::domain::{Language, Method, ModelName, Task, TranscriptionResult};

pub const NORMALIZE_STEP: &str = "Normalize_Audio";
pub const ACQUIRE_STEP: &str = "Acquire_Model";
pub const INFERENCE_STEP: &str = "Inference";

#[derive(Debug, Clone)]
pub struct AsrRequest {
    pub method: Method,
    pub task: Task,
    pub language: Option<Language>,
    pub initial_prompt: Option<String>,
    /// Run the uploaded bytes through the audio decoder.
    pub encode: bool,
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageDetection {
    pub detected_language: String,
    pub language_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionServiceError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error("blocking worker failed: {0}")]
    Worker(String),
}

/// Runs the request pipeline: normalize, lock, infer, assemble.
pub struct TranscriptionService {
    normalizer: Arc<AudioNormalizer>,
    registry: Arc<ModelRegistry>,
}

impl TranscriptionService {
    pub fn new(normalizer: Arc<AudioNormalizer>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            normalizer,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        request: AsrRequest,
    ) -> Result<TranscriptionResult, TranscriptionServiceError> {
        let mut timer = StepTimer::new("asr");
        timer.start()?;

        let decoded = self.normalize(audio, request.encode).await?;
        timer.time_step(NORMALIZE_STEP)?;

        let normalized_duration = decoded.duration;
        let waveform: Arc<[f32]> = decoded.samples.into();
        let requested_language = request.language.map(|l| l.code().to_string());
        let options = TranscribeOptions {
            task: request.task,
            language: requested_language.clone(),
            initial_prompt: request.initial_prompt,
        };
        let method = request.method;
        let file_id = request.file_id;

        let result = self
            .registry
            .with_backend(
                method,
                move |handle| -> Result<TranscriptionResult, TranscriptionServiceError> {
                    timer.time_step(ACQUIRE_STEP)?;

                    let backend = handle.backend();
                    let output = backend.transcribe(waveform, &options)?;
                    let transcript = ResultAssembler::drain(output)?;
                    timer.time_step(INFERENCE_STEP)?;
                    timer.stop()?;

                    Ok(ResultAssembler::assemble(
                        transcript,
                        ResultMetadata {
                            requested_language,
                            duration: normalized_duration,
                            method,
                            gpu: backend.uses_gpu(),
                            model: handle.model_name().to_string(),
                            file_id,
                            timings: timer.steps().clone(),
                        },
                    ))
                },
            )
            .await??;

        tracing::info!(
            file_id = result.file_id(),
            method = %result.method(),
            model = result.model(),
            language = result.language(),
            segments = result.segments().len(),
            duration = result.duration(),
            elapsed = ?result.timings().total_elapsed(),
            "Transcription completed"
        );

        Ok(result)
    }

    pub async fn detect_language(
        &self,
        audio: Vec<u8>,
        method: Method,
        encode: bool,
    ) -> Result<LanguageDetection, TranscriptionServiceError> {
        let decoded = self.normalize(audio, encode).await?;
        let waveform = decoded.samples;

        let code = self
            .registry
            .with_backend(method, move |handle| {
                handle.backend().detect_language(&waveform)
            })
            .await??;

        let detected_language = Language::from_code(&code)
            .map(|language| language.name().to_string())
            .unwrap_or_else(|_| code.clone());

        tracing::info!(method = %method, language = %code, "Language detected");

        Ok(LanguageDetection {
            detected_language,
            language_code: code,
        })
    }

    pub async fn change_model(
        &self,
        model: &ModelName,
    ) -> Result<ModelChange, TranscriptionServiceError> {
        Ok(self.registry.change_model(model.as_str()).await?)
    }

    async fn normalize(
        &self,
        audio: Vec<u8>,
        encode: bool,
    ) -> Result<DecodedAudio, TranscriptionServiceError> {
        let normalizer = Arc::clone(&self.normalizer);

        let decoded = tokio::task::spawn_blocking(move || normalizer.normalize(&audio, encode))
            .await
            .map_err(|e| TranscriptionServiceError::Worker(e.to_string()))??;

        Ok(decoded)
    }
}
