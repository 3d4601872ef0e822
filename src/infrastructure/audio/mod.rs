mod candle_whisper_engine;
mod ffmpeg_decoder;
mod mel_filters;
mod mock_audio_decoder;
mod mock_inference_backend;
mod streaming_whisper_engine;
mod symphonia_decoder;
mod whisper_model;
mod whisper_model_loader;

pub use candle_whisper_engine::CandleWhisperEngine;
pub use ffmpeg_decoder::{
    DEFAULT_FFMPEG_BINARY, FfmpegAudioDecoder, check_ffmpeg_binary, parse_progress_duration,
};
pub use mel_filters::mel_filters;
pub use mock_audio_decoder::MockAudioDecoder;
pub use mock_inference_backend::{InferenceTracker, MockInferenceBackend, MockModelLoader};
pub use streaming_whisper_engine::StreamingWhisperEngine;
pub use symphonia_decoder::SymphoniaAudioDecoder;
pub use whisper_model::{
    TimedTokens, TimestampTokens, WhisperFiles, WhisperModel, is_silent, pair_timestamps,
    suppress_logits, window_count,
};
pub use whisper_model_loader::{
    DevicePreference, WhisperModelLoader, WhisperModelSource, select_device,
};
