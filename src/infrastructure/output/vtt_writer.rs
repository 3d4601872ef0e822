use std::io;

use crate::application::ports::ResultWriter;
use crate::domain::TranscriptionResult;

use super::timestamp::format_timestamp;

pub struct VttWriter;

impl ResultWriter for VttWriter {
    fn write_result(
        &self,
        result: &TranscriptionResult,
        sink: &mut dyn io::Write,
    ) -> io::Result<()> {
        write!(sink, "WEBVTT\n\n")?;
        for segment in result.segments() {
            writeln!(
                sink,
                "{} --> {}",
                format_timestamp(segment.start, '.'),
                format_timestamp(segment.end, '.')
            )?;
            writeln!(sink, "{}", segment.text.trim().replace("-->", "->"))?;
            writeln!(sink)?;
        }
        Ok(())
    }
}
