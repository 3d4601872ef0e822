use std::io;

use crate::application::ports::ResultWriter;
use crate::domain::TranscriptionResult;

use super::timestamp::to_millis;

/// Tab-separated rows of `start`, `end` (integer milliseconds) and `text`.
pub struct TsvWriter;

impl ResultWriter for TsvWriter {
    fn write_result(
        &self,
        result: &TranscriptionResult,
        sink: &mut dyn io::Write,
    ) -> io::Result<()> {
        writeln!(sink, "start\tend\ttext")?;
        for segment in result.segments() {
            writeln!(
                sink,
                "{}\t{}\t{}",
                to_millis(segment.start),
                to_millis(segment.end),
                segment.text.trim().replace('\t', " ")
            )?;
        }
        Ok(())
    }
}
