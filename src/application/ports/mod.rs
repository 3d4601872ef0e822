mod audio_decoder;
mod inference_backend;
mod model_loader;
mod result_writer;

pub use audio_decoder::{AudioDecoder, DecodeError, DecodedAudio};
pub use inference_backend::{
    BackendOutput, CompleteTranscript, InferenceBackend, InferenceError, SegmentStream,
    TranscribeOptions,
};
pub use model_loader::{LoadError, ModelLoader};
pub use result_writer::ResultWriter;
