use std::io;

use crate::domain::TranscriptionResult;

/// Renders a canonical result into one output format.
pub trait ResultWriter: Send + Sync {
    fn write_result(&self, result: &TranscriptionResult, sink: &mut dyn io::Write)
    -> io::Result<()>;

    fn render(&self, result: &TranscriptionResult) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_result(result, &mut buffer)?;
        Ok(buffer)
    }
}
