use std::sync::Arc;

use crate::domain::{Method, Segment, Task};

/// Speech recognition capability shared by every engine.
///
/// Calls are blocking; callers run them on a blocking thread while holding
/// the model registry lock.
pub trait InferenceBackend: Send + Sync {
    fn method(&self) -> Method;

    /// Name the handle was loaded under.
    fn model_name(&self) -> &str;

    fn uses_gpu(&self) -> bool;

    fn transcribe(
        &self,
        waveform: Arc<[f32]>,
        options: &TranscribeOptions,
    ) -> Result<BackendOutput, InferenceError>;

    fn detect_language(&self, waveform: &[f32]) -> Result<String, InferenceError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscribeOptions {
    pub task: Task,
    /// Language hint; detected from the audio when absent.
    pub language: Option<String>,
    pub initial_prompt: Option<String>,
}

/// What an engine hands back, before normalization into a canonical result.
pub enum BackendOutput {
    Complete(CompleteTranscript),
    Streaming(SegmentStream),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompleteTranscript {
    pub language: String,
    pub segments: Vec<Segment>,
    pub text: String,
    pub duration: Option<f64>,
}

type SegmentIter = Box<dyn Iterator<Item = Result<Segment, InferenceError>> + Send>;

/// Finite, single-pass sequence of segments decoded on demand.
///
/// Consumed by value, so it cannot be restarted or read twice.
pub struct SegmentStream {
    language: String,
    duration: Option<f64>,
    segments: SegmentIter,
}

impl SegmentStream {
    pub fn new<I>(language: impl Into<String>, duration: Option<f64>, segments: I) -> Self
    where
        I: Iterator<Item = Result<Segment, InferenceError>> + Send + 'static,
    {
        Self {
            language: language.into(),
            duration,
            segments: Box::new(segments),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Duration of the audio as measured by the engine.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }
}

impl Iterator for SegmentStream {
    type Item = Result<Segment, InferenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.segments.next()
    }
}

impl std::fmt::Debug for SegmentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentStream")
            .field("language", &self.language)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("language detection failed: {0}")]
    LanguageDetectionFailed(String),
}
