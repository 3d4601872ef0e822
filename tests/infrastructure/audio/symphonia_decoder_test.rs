use whisper_asr::application::ports::AudioDecoder;
use whisper_asr::infrastructure::audio::SymphoniaAudioDecoder;

use crate::helpers::build_wav;

const LEVEL: i16 = 8_000;

fn mean(samples: &[f32]) -> f32 {
    samples.iter().sum::<f32>() / samples.len() as f32
}

#[test]
fn given_wav_at_44100hz_when_resampling_then_length_is_exact() {
    let wav = build_wav(44_100, &vec![LEVEL; 44_100]);

    let audio = SymphoniaAudioDecoder.decode(&wav, 16_000).unwrap();

    assert_eq!(audio.samples.len(), 16_000);
    assert_eq!(audio.duration, Some(1.0));
}

#[test]
fn given_steady_tone_when_resampling_then_head_and_tail_keep_their_level() {
    let wav = build_wav(44_100, &vec![LEVEL; 44_100]);
    let expected = LEVEL as f32 / 32_768.0;

    let audio = SymphoniaAudioDecoder.decode(&wav, 16_000).unwrap();
    let samples = &audio.samples;

    let head = mean(&samples[..32]);
    let tail = mean(&samples[samples.len() - 32..]);
    assert!(head > 0.7 * expected, "head level {}", head);
    assert!(tail > 0.7 * expected, "tail level {}", tail);
    assert!((samples[8_000] - expected).abs() < 0.05 * expected);
}

#[test]
fn given_short_clip_when_resampling_then_every_output_sample_is_filled() {
    // Shorter than one resampler chunk, so all of it comes from the flush.
    let wav = build_wav(48_000, &vec![LEVEL; 300]);

    let audio = SymphoniaAudioDecoder.decode(&wav, 16_000).unwrap();

    assert_eq!(audio.samples.len(), 100);
    assert!(mean(&audio.samples) > 0.5 * LEVEL as f32 / 32_768.0);
}
