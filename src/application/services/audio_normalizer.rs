use std::sync::Arc;

use crate::application::ports::{AudioDecoder, DecodeError, DecodedAudio};

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Turns uploaded bytes into a mono `f32` waveform at a fixed sample rate.
pub struct AudioNormalizer {
    decoder: Arc<dyn AudioDecoder>,
    sample_rate: u32,
}

impl AudioNormalizer {
    pub fn new(decoder: Arc<dyn AudioDecoder>, sample_rate: u32) -> Self {
        Self {
            decoder,
            sample_rate,
        }
    }

    /// With `decode` set the bytes go through the audio decoder; otherwise they are
    /// taken as 16-bit little-endian mono PCM already at the target rate.
    pub fn normalize(&self, data: &[u8], decode: bool) -> Result<DecodedAudio, DecodeError> {
        let audio = if decode {
            self.decoder.decode(data, self.sample_rate)?
        } else {
            DecodedAudio {
                samples: pcm16le_to_f32(data)?,
                duration: None,
            }
        };

        tracing::debug!(
            samples = audio.samples.len(),
            sample_rate = self.sample_rate,
            duration = ?audio.duration,
            decoded = decode,
            "Audio normalized"
        );

        Ok(audio)
    }
}

/// Converts signed 16-bit little-endian PCM to samples in `[-1.0, 1.0]`.
pub fn pcm16le_to_f32(data: &[u8]) -> Result<Vec<f32>, DecodeError> {
    if data.len() % 2 != 0 {
        return Err(DecodeError::MalformedPcm(format!(
            "odd byte length {} for 16-bit samples",
            data.len()
        )));
    }

    Ok(data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}
