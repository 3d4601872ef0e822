use serde::Serialize;

use super::{Method, Segment, TimedSteps};

/// Duration reported when neither the decoder nor the backend measured one.
pub const UNKNOWN_DURATION: f64 = -1.0;

/// Canonical transcription record consumed by every result writer.
///
/// Built once by the result assembler and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    language: String,
    segments: Vec<Segment>,
    text: String,
    method: Method,
    gpu: bool,
    model: String,
    duration: f64,
    file_id: String,
    timings: TimedSteps,
}

impl TranscriptionResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        language: String,
        segments: Vec<Segment>,
        text: String,
        method: Method,
        gpu: bool,
        model: String,
        duration: f64,
        file_id: String,
        timings: TimedSteps,
    ) -> Self {
        Self {
            language,
            segments,
            text,
            method,
            gpu,
            model,
            duration,
            file_id,
            timings,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn gpu(&self) -> bool {
        self.gpu
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Source duration in seconds, `-1` when unknown.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn known_duration(&self) -> Option<f64> {
        (self.duration >= 0.0).then_some(self.duration)
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn timings(&self) -> &TimedSteps {
        &self.timings
    }
}
