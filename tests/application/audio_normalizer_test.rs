use std::sync::Arc;

use whisper_asr::application::ports::DecodeError;
use whisper_asr::application::services::{AudioNormalizer, pcm16le_to_f32};
use whisper_asr::infrastructure::audio::{MockAudioDecoder, SymphoniaAudioDecoder};

use crate::helpers::build_wav;

#[test]
fn given_raw_pcm_when_normalizing_without_decode_then_length_matches_duration() {
    let normalizer = AudioNormalizer::new(Arc::new(MockAudioDecoder::default()), 16_000);
    let pcm: Vec<u8> = vec![0u8; 16_000 * 2 * 3];

    let audio = normalizer.normalize(&pcm, false).unwrap();

    assert_eq!(audio.samples.len(), 3 * 16_000);
    assert_eq!(audio.duration, None);
}

#[test]
fn given_extreme_samples_when_converting_then_scaled_to_unit_range() {
    let mut pcm = Vec::new();
    pcm.extend_from_slice(&i16::MIN.to_le_bytes());
    pcm.extend_from_slice(&0i16.to_le_bytes());
    pcm.extend_from_slice(&16_384i16.to_le_bytes());

    let samples = pcm16le_to_f32(&pcm).unwrap();

    assert_eq!(samples, vec![-1.0, 0.0, 0.5]);
}

#[test]
fn given_odd_byte_count_when_normalizing_without_decode_then_malformed_pcm() {
    let normalizer = AudioNormalizer::new(Arc::new(MockAudioDecoder::default()), 16_000);

    let result = normalizer.normalize(&[0u8; 3], false);

    assert!(matches!(result, Err(DecodeError::MalformedPcm(_))));
}

#[test]
fn given_wav_at_target_rate_when_normalizing_with_symphonia_then_length_matches_duration() {
    let normalizer = AudioNormalizer::new(Arc::new(SymphoniaAudioDecoder), 16_000);
    let wav = build_wav(16_000, &vec![1000i16; 32_000]);

    let audio = normalizer.normalize(&wav, true).unwrap();

    assert_eq!(audio.samples.len(), 32_000);
    assert_eq!(audio.duration, Some(2.0));
}

#[test]
fn given_wav_at_other_rate_when_normalizing_with_symphonia_then_resampled() {
    let normalizer = AudioNormalizer::new(Arc::new(SymphoniaAudioDecoder), 16_000);
    let wav = build_wav(44_100, &vec![0i16; 44_100]);

    let audio = normalizer.normalize(&wav, true).unwrap();

    let expected = 16_000i64;
    assert!(
        (audio.samples.len() as i64 - expected).abs() <= 160,
        "got {} samples",
        audio.samples.len()
    );
}

#[test]
fn given_failing_decoder_when_normalizing_then_diagnostics_surface() {
    let normalizer =
        AudioNormalizer::new(Arc::new(MockAudioDecoder::failing("moov atom not found")), 16_000);

    let err = normalizer.normalize(b"bytes", true).unwrap_err();

    assert!(err.to_string().contains("moov atom not found"));
}
