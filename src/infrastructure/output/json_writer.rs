use std::io;

use crate::application::ports::ResultWriter;
use crate::domain::TranscriptionResult;

pub struct JsonWriter;

impl ResultWriter for JsonWriter {
    fn write_result(
        &self,
        result: &TranscriptionResult,
        sink: &mut dyn io::Write,
    ) -> io::Result<()> {
        serde_json::to_writer(&mut *sink, result).map_err(io::Error::other)
    }
}
