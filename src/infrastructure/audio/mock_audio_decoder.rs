use crate::application::ports::{AudioDecoder, DecodeError, DecodedAudio};

/// Returns a fixed waveform regardless of input, or fails when `fail_with` is set.
#[derive(Debug, Clone, Default)]
pub struct MockAudioDecoder {
    pub samples: Vec<f32>,
    pub duration: Option<f64>,
    pub fail_with: Option<String>,
}

impl MockAudioDecoder {
    pub fn silence(seconds: f64, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; (seconds * sample_rate as f64) as usize],
            duration: Some(seconds),
            fail_with: None,
        }
    }

    pub fn failing(diagnostics: impl Into<String>) -> Self {
        Self {
            fail_with: Some(diagnostics.into()),
            ..Self::default()
        }
    }
}

impl AudioDecoder for MockAudioDecoder {
    fn decode(&self, _data: &[u8], _sample_rate: u32) -> Result<DecodedAudio, DecodeError> {
        if let Some(diagnostics) = &self.fail_with {
            return Err(DecodeError::DecodingFailed(diagnostics.clone()));
        }

        Ok(DecodedAudio {
            samples: self.samples.clone(),
            duration: self.duration,
        })
    }
}
