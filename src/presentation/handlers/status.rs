use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::PollReply;
use crate::domain::JobId;
use crate::presentation::handlers::TranscriptionAccepted;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    #[serde(rename = "job-id")]
    pub job_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Reports the state of a transcription job. Reading a terminal state
/// consumes the job: the result is served to exactly one caller and any
/// later poll sees not-found.
#[tracing::instrument(skip(state))]
pub async fn transcription_status_handler(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Response {
    let uuid = match Uuid::parse_str(&params.job_id) {
        Ok(u) => u,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid job ID: {}", params.job_id),
                }),
            )
                .into_response();
        }
    };
    let id = JobId::from_uuid(uuid);

    match state.transcription_service.poll(id).await {
        Ok(PollReply::Pending) => (
            StatusCode::ACCEPTED,
            Json(TranscriptionAccepted::for_job(id)),
        )
            .into_response(),
        Ok(PollReply::Finished { content_type, body }) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Ok(PollReply::Failed { message }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
        Ok(PollReply::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to poll job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to poll job: {}", e),
                }),
            )
                .into_response()
        }
    }
}
