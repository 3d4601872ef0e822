mod language;
mod method;
mod model_name;
mod output_format;
mod segment;
mod task;
mod timed_steps;
mod transcription_result;

pub use language::{LANGUAGES, Language, UnsupportedLanguageError};
pub use method::{Method, UnsupportedMethodError};
pub use model_name::{KNOWN_MODELS, ModelName, UnsupportedModelError};
pub use output_format::{OutputFormat, UnsupportedOutputError};
pub use segment::Segment;
pub use task::{Task, UnsupportedTaskError};
pub use timed_steps::{STOPPED_STEP, TOTAL_ELAPSED_STEP, TimedSteps};
pub use transcription_result::{TranscriptionResult, UNKNOWN_DURATION};
