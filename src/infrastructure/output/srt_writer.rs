use std::io;

use crate::application::ports::ResultWriter;
use crate::domain::TranscriptionResult;

use super::timestamp::format_timestamp;

/// SubRip subtitles. Cue text may not contain the `-->` arrow.
pub struct SrtWriter;

impl ResultWriter for SrtWriter {
    fn write_result(
        &self,
        result: &TranscriptionResult,
        sink: &mut dyn io::Write,
    ) -> io::Result<()> {
        for (index, segment) in result.segments().iter().enumerate() {
            writeln!(sink, "{}", index + 1)?;
            writeln!(
                sink,
                "{} --> {}",
                format_timestamp(segment.start, ','),
                format_timestamp(segment.end, ',')
            )?;
            writeln!(sink, "{}", segment.text.trim().replace("-->", "->"))?;
            writeln!(sink)?;
        }
        Ok(())
    }
}
