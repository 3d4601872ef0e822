mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ASR_MODEL_ENV, ASR_MODEL_PATH_ENV, AudioSettings, DecoderKind, LoggingSettings,
    ModelSettings, ServerSettings, Settings,
};
