mod audio_normalizer;
mod model_registry;
mod result_assembler;
mod step_timer;
mod transcription_service;

pub use audio_normalizer::{AudioNormalizer, DEFAULT_SAMPLE_RATE, pcm16le_to_f32};
pub use model_registry::{ModelChange, ModelHandle, ModelRegistry, RegistryError, RegistryGuard};
pub use result_assembler::{ResultAssembler, ResultMetadata};
pub use step_timer::{StepSink, StepTimer, TimerError};
pub use transcription_service::{
    ACQUIRE_STEP, AsrRequest, INFERENCE_STEP, LanguageDetection, NORMALIZE_STEP,
    TranscriptionService, TranscriptionServiceError,
};
