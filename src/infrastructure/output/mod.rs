mod json_writer;
mod srt_writer;
mod timestamp;
mod tsv_writer;
mod txt_writer;
mod vtt_writer;

pub use json_writer::JsonWriter;
pub use srt_writer::SrtWriter;
pub use timestamp::{format_timestamp, to_millis};
pub use tsv_writer::TsvWriter;
pub use txt_writer::TxtWriter;
pub use vtt_writer::VttWriter;

use crate::application::ports::ResultWriter;
use crate::domain::OutputFormat;

pub fn writer_for(format: OutputFormat) -> Box<dyn ResultWriter> {
    match format {
        OutputFormat::Txt => Box::new(TxtWriter),
        OutputFormat::Vtt => Box::new(VttWriter),
        OutputFormat::Srt => Box::new(SrtWriter),
        OutputFormat::Tsv => Box::new(TsvWriter),
        OutputFormat::Json => Box::new(JsonWriter),
    }
}
