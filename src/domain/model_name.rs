use std::fmt;
use std::str::FromStr;

/// Whisper checkpoints the service can load, by their short names.
pub const KNOWN_MODELS: [&str; 12] = [
    "tiny",
    "tiny.en",
    "base",
    "base.en",
    "small",
    "small.en",
    "medium",
    "medium.en",
    "large-v1",
    "large-v2",
    "large-v3",
    "large",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelName(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported model: {0}")]
pub struct UnsupportedModelError(pub String);

impl ModelName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English-only checkpoints have no language tokens.
    pub fn is_english_only(&self) -> bool {
        self.0.ends_with(".en")
    }

    /// Hugging Face repository holding the safetensors checkpoint.
    pub fn hub_repository(&self) -> String {
        format!("openai/whisper-{}", self.0)
    }
}

impl FromStr for ModelName {
    type Err = UnsupportedModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if KNOWN_MODELS.contains(&s) {
            Ok(Self(s.to_string()))
        } else {
            Err(UnsupportedModelError(s.to_string()))
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
