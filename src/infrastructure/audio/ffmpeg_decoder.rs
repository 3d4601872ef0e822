use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;

use crate::application::ports::{AudioDecoder, DecodeError, DecodedAudio};
use crate::application::services::pcm16le_to_f32;

pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

static PROGRESS_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("valid progress time pattern")
});

/// Decodes through an `ffmpeg` child process reading stdin and writing raw PCM to stdout.
#[derive(Debug, Clone)]
pub struct FfmpegAudioDecoder {
    binary: String,
}

impl FfmpegAudioDecoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegAudioDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_BINARY)
    }
}

impl AudioDecoder for FfmpegAudioDecoder {
    fn decode(&self, data: &[u8], sample_rate: u32) -> Result<DecodedAudio, DecodeError> {
        let rate = sample_rate.to_string();
        let mut child = Command::new(&self.binary)
            .args([
                "-hide_banner",
                "-threads",
                "0",
                "-i",
                "pipe:0",
                "-f",
                "s16le",
                "-acodec",
                "pcm_s16le",
                "-ac",
                "1",
                "-ar",
                rate.as_str(),
                "pipe:1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecodeError::DecoderUnavailable(format!("{}: {}", self.binary, e)))?;

        // stdin is fed from its own thread so a full stdout pipe cannot deadlock us
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DecodeError::DecodingFailed("ffmpeg stdin unavailable".to_string()))?;
        let input = data.to_vec();
        let feeder = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|e| DecodeError::DecodingFailed(format!("ffmpeg: {}", e)))?;

        let diagnostics = String::from_utf8_lossy(&output.stderr);

        match feeder.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("ffmpeg closed stdin before reading all input");
            }
            Ok(Err(e)) => {
                return Err(DecodeError::DecodingFailed(format!(
                    "writing to ffmpeg: {}",
                    e
                )));
            }
            Err(_) => {
                return Err(DecodeError::DecodingFailed(
                    "ffmpeg input thread panicked".to_string(),
                ));
            }
        }

        if !output.status.success() {
            return Err(DecodeError::DecodingFailed(format!(
                "Failed to load audio: {}",
                diagnostics.trim()
            )));
        }

        let samples = pcm16le_to_f32(&output.stdout)?;
        let duration = parse_progress_duration(&diagnostics);

        tracing::debug!(
            input_bytes = data.len(),
            samples = samples.len(),
            duration = ?duration,
            "Audio decoded via ffmpeg"
        );

        Ok(DecodedAudio { samples, duration })
    }
}

/// Seconds from the last `time=HH:MM:SS.ff` progress entry in ffmpeg's stderr.
pub fn parse_progress_duration(diagnostics: &str) -> Option<f64> {
    let captures = PROGRESS_TIME.captures_iter(diagnostics).last()?;

    let hours: f64 = captures[1].parse().ok()?;
    let minutes: f64 = captures[2].parse().ok()?;
    let seconds: f64 = captures[3].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Fails when the ffmpeg binary cannot be executed.
pub fn check_ffmpeg_binary(binary: &str) -> Result<(), DecodeError> {
    let output = Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| DecodeError::DecoderUnavailable(format!("{}: {}", binary, e)))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(DecodeError::DecoderUnavailable(format!(
            "{} -version exited with {}",
            binary, output.status
        )))
    }
}
