/// Decodes an arbitrary uploaded container into mono PCM at a fixed rate.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, data: &[u8], sample_rate: u32) -> Result<DecodedAudio, DecodeError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Source duration in seconds when the decoder could measure it.
    pub duration: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("malformed pcm stream: {0}")]
    MalformedPcm(String),
    #[error("audio decoder unavailable: {0}")]
    DecoderUnavailable(String),
}
