use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::services::SubmitRequest;
use crate::domain::{JobId, OutputFormat, TaskKind};
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TranscribeParams {
    pub language: Option<String>,
    #[serde(default)]
    pub diarize: bool,
}

/// Accepted-job descriptor handed to polling clients.
#[derive(Serialize)]
pub struct TranscriptionAccepted {
    pub task: TaskRef,
}

#[derive(Serialize)]
pub struct TaskRef {
    pub id: String,
    pub href: String,
}

impl TranscriptionAccepted {
    pub fn for_job(id: JobId) -> Self {
        let id = id.as_uuid().to_string();
        Self {
            task: TaskRef {
                href: format!("/transcription-status?job-id={}", id),
                id,
            },
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Starts a transcription of the posted audio. Replies immediately with a
/// polling reference; recognition itself may take minutes.
#[tracing::instrument(skip(state, headers, body))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    Query(params): Query<TranscribeParams>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("text/plain");
    let format = OutputFormat::from_accept(accept);

    tracing::debug!(bytes = body.len(), accept, format = %format, "Transcription upload received");

    let request = SubmitRequest {
        language: params.language,
        diarize: params.diarize,
        task: TaskKind::Transcribe,
        format,
    };

    match state.transcription_service.submit(body, request).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(TranscriptionAccepted::for_job(job_id)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to admit transcription job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create job: {}", e),
                }),
            )
                .into_response()
        }
    }
}
