use std::io;

use crate::application::ports::ResultWriter;
use crate::domain::TranscriptionResult;

pub struct TxtWriter;

impl ResultWriter for TxtWriter {
    fn write_result(
        &self,
        result: &TranscriptionResult,
        sink: &mut dyn io::Write,
    ) -> io::Result<()> {
        if result.segments().is_empty() {
            let text = result.text().trim();
            if !text.is_empty() {
                writeln!(sink, "{}", text)?;
            }
            return Ok(());
        }

        for segment in result.segments() {
            writeln!(sink, "{}", segment.text.trim())?;
        }
        Ok(())
    }
}
