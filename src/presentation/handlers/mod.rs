mod asr;
mod change_model;
mod detect_language;
mod error;
mod health;
mod upload;

pub use asr::{AsrQuery, asr_handler};
pub use change_model::{ChangeModelQuery, change_model_handler};
pub use detect_language::{DetectLanguageQuery, detect_language_handler};
pub use error::{ErrorResponse, error_response, service_error_status};
pub use health::health_handler;
pub use upload::{AUDIO_FIELD, attachment_disposition};
