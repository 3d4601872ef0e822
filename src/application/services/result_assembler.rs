use crate::application::ports::{BackendOutput, CompleteTranscript, InferenceError};
use crate::domain::{Method, Segment, TimedSteps, TranscriptionResult, UNKNOWN_DURATION};

/// Request-side facts merged into the canonical result.
#[derive(Debug, Clone)]
pub struct ResultMetadata {
    pub requested_language: Option<String>,
    /// Duration reported by the audio normalizer.
    pub duration: Option<f64>,
    pub method: Method,
    pub gpu: bool,
    pub model: String,
    pub file_id: String,
    pub timings: TimedSteps,
}

pub struct ResultAssembler;

impl ResultAssembler {
    /// Turns any backend output into a complete transcript, consuming a
    /// streaming sequence to its end. The first segment error aborts.
    pub fn drain(output: BackendOutput) -> Result<CompleteTranscript, InferenceError> {
        match output {
            BackendOutput::Complete(transcript) => Ok(transcript),
            BackendOutput::Streaming(stream) => {
                let language = stream.language().to_string();
                let duration = stream.duration();

                let mut segments: Vec<Segment> = Vec::new();
                let mut text = String::new();
                for segment in stream {
                    let segment = segment?;
                    text.push_str(&segment.text);
                    segments.push(segment);
                }

                Ok(CompleteTranscript {
                    language,
                    segments,
                    text,
                    duration,
                })
            }
        }
    }

    pub fn assemble(transcript: CompleteTranscript, metadata: ResultMetadata) -> TranscriptionResult {
        let language = metadata
            .requested_language
            .unwrap_or(transcript.language);

        let duration = metadata
            .duration
            .filter(|d| *d >= 0.0)
            .or(transcript.duration)
            .unwrap_or(UNKNOWN_DURATION);

        TranscriptionResult::new(
            language,
            transcript.segments,
            transcript.text,
            metadata.method,
            metadata.gpu,
            metadata.model,
            duration,
            metadata.file_id,
            metadata.timings,
        )
    }

    pub fn assemble_output(
        output: BackendOutput,
        metadata: ResultMetadata,
    ) -> Result<TranscriptionResult, InferenceError> {
        let transcript = Self::drain(output)?;
        Ok(Self::assemble(transcript, metadata))
    }
}
