use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::Response;

use super::error::error_response;

pub const AUDIO_FIELD: &str = "audio_file";
const FALLBACK_BASENAME: &str = "audio";

pub struct AudioUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl AudioUpload {
    /// The uploaded filename up to its first `.`.
    pub fn basename(&self) -> &str {
        let stem = self.filename.split('.').next().unwrap_or_default();
        if stem.is_empty() { FALLBACK_BASENAME } else { stem }
    }
}

/// `Content-Disposition` value for a download named `basename.extension`.
/// Quotes, backslashes and control characters are dropped from the name.
pub fn attachment_disposition(basename: &str, extension: &str) -> String {
    let name: String = basename
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    let name = if name.is_empty() {
        FALLBACK_BASENAME
    } else {
        name.as_str()
    };
    format!("attachment; filename=\"{}.{}\"", name, extension)
}

/// Reads the `audio_file` field, skipping any others.
pub async fn read_audio_upload(multipart: &mut Multipart) -> Result<AudioUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Request without audio_file field");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Missing multipart field '{}'", AUDIO_FIELD),
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                ));
            }
        };

        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read file bytes");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {}", e),
                ));
            }
        };

        tracing::debug!(filename = %filename, bytes = data.len(), "Audio upload received");

        return Ok(AudioUpload {
            filename,
            data: data.to_vec(),
        });
    }
}
