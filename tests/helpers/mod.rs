use std::sync::Arc;

use whisper_asr::application::ports::{AudioDecoder, ModelLoader};
use whisper_asr::application::services::{AudioNormalizer, ModelRegistry, TranscriptionService};
use whisper_asr::domain::Method;
use whisper_asr::infrastructure::audio::{MockInferenceBackend, MockModelLoader};

pub const TEST_MODEL: &str = "base";

pub fn build_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let num_samples = samples.len() as u32;
    let byte_rate = sample_rate * 2;
    let data_size = num_samples * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

pub fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn mock_loaders(template: &MockInferenceBackend) -> Vec<Arc<dyn ModelLoader>> {
    Method::ALL
        .iter()
        .map(|&method| {
            let mut backend = template.clone();
            backend.method = method;
            Arc::new(MockModelLoader::from_template(backend)) as Arc<dyn ModelLoader>
        })
        .collect()
}

/// Service over mock backends with `TEST_MODEL` already loaded.
pub async fn mock_service(
    decoder: Arc<dyn AudioDecoder>,
    template: MockInferenceBackend,
) -> Arc<TranscriptionService> {
    let registry = Arc::new(ModelRegistry::new(mock_loaders(&template)));
    registry.initialize(TEST_MODEL).await.unwrap();

    let normalizer = Arc::new(AudioNormalizer::new(decoder, 16_000));
    Arc::new(TranscriptionService::new(normalizer, registry))
}
