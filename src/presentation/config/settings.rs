use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

use crate::application::services::DEFAULT_SAMPLE_RATE;
use crate::domain::Method;
use crate::infrastructure::audio::{DEFAULT_FFMPEG_BINARY, DevicePreference};

use super::Environment;

/// Classic variable naming the model to load at startup.
pub const ASR_MODEL_ENV: &str = "ASR_MODEL";
/// Classic variable naming the directory models are stored in.
pub const ASR_MODEL_PATH_ENV: &str = "ASR_MODEL_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub audio: AudioSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    pub name: String,
    pub path: String,
    pub methods: Vec<Method>,
    pub device: DevicePreference,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "base".to_string(),
            path: "models".to_string(),
            methods: Method::ALL.to_vec(),
            device: DevicePreference::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    #[default]
    Ffmpeg,
    Symphonia,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub decoder: DecoderKind,
    pub ffmpeg_binary: String,
    pub max_upload_mb: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            decoder: DecoderKind::Ffmpeg,
            ffmpeg_binary: DEFAULT_FFMPEG_BINARY.to_string(),
            max_upload_mb: 200,
        }
    }
}

impl AudioSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Layers built-in defaults, `appsettings.{environment}.toml`, `APP__*`
    /// variables, and finally `ASR_MODEL` / `ASR_MODEL_PATH`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Self::builder(environment)?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The Whisper front end is fixed at 16 kHz, so decoding to any other rate
    /// would silently skew every timestamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate != DEFAULT_SAMPLE_RATE {
            return Err(ConfigError::Message(format!(
                "audio.sample_rate must be {} Hz, got {}",
                DEFAULT_SAMPLE_RATE, self.audio.sample_rate
            )));
        }
        Ok(())
    }

    fn builder(
        environment: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("model.methods")
                    .try_parsing(true),
            )
            .set_override_option("model.name", std::env::var(ASR_MODEL_ENV).ok())?
            .set_override_option("model.path", std::env::var(ASR_MODEL_PATH_ENV).ok())
    }
}
