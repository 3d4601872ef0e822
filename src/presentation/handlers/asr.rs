use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::application::services::AsrRequest;
use crate::domain::{Language, Method, OutputFormat, Task};
use crate::infrastructure::observability::sanitize_prompt;
use crate::infrastructure::output::writer_for;
use crate::presentation::state::AppState;

use super::error::{error_response, service_error_response};
use super::upload::{attachment_disposition, read_audio_upload};

#[derive(Debug, Deserialize)]
pub struct AsrQuery {
    pub method: Option<String>,
    pub task: Option<String>,
    pub language: Option<String>,
    pub initial_prompt: Option<String>,
    pub encode: Option<bool>,
    pub output: Option<String>,
}

struct ParsedAsrQuery {
    method: Method,
    task: Task,
    language: Option<Language>,
    output: OutputFormat,
}

impl AsrQuery {
    fn parse(&self) -> Result<ParsedAsrQuery, String> {
        let method = match &self.method {
            Some(m) => m.parse::<Method>().map_err(|e| e.to_string())?,
            None => Method::default(),
        };
        let task = match &self.task {
            Some(t) => t.parse::<Task>().map_err(|e| e.to_string())?,
            None => Task::default(),
        };
        let language = match self.language.as_deref() {
            Some(code) if !code.is_empty() => {
                Some(code.parse::<Language>().map_err(|e| e.to_string())?)
            }
            _ => None,
        };
        let output = match &self.output {
            Some(o) => o.parse::<OutputFormat>().map_err(|e| e.to_string())?,
            None => OutputFormat::default(),
        };
        Ok(ParsedAsrQuery {
            method,
            task,
            language,
            output,
        })
    }
}

#[tracing::instrument(skip(state, query, multipart))]
pub async fn asr_handler(
    State(state): State<AppState>,
    Query(query): Query<AsrQuery>,
    mut multipart: Multipart,
) -> Response {
    let parsed = match query.parse() {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e),
    };

    let upload = match read_audio_upload(&mut multipart).await {
        Ok(u) => u,
        Err(response) => return response,
    };
    let basename = upload.basename().to_string();

    if let Some(prompt) = &query.initial_prompt {
        tracing::debug!(initial_prompt = %sanitize_prompt(prompt), "Initial prompt supplied");
    }

    let request = AsrRequest {
        method: parsed.method,
        task: parsed.task,
        language: parsed.language,
        initial_prompt: query.initial_prompt.filter(|p| !p.trim().is_empty()),
        encode: query.encode.unwrap_or(true),
        file_id: basename.clone(),
    };

    let result = match state
        .transcription_service
        .transcribe(upload.data, request)
        .await
    {
        Ok(r) => r,
        Err(e) => return service_error_response(e),
    };

    let body = match writer_for(parsed.output).render(&result) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "Failed to render result");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render result: {}", e),
            );
        }
    };

    let disposition = attachment_disposition(&basename, parsed.output.extension());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, parsed.output.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(body),
    )
        .into_response()
}
