use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::presentation::state::AppState;

/// Converts any posted audio into the WAV format the recognizer requires.
#[tracing::instrument(skip(state, body))]
pub async fn convert_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match state.audio_converter.convert_to_wav(body).await {
        Ok(wav) => (StatusCode::OK, [(header::CONTENT_TYPE, "audio/wav")], wav).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Audio conversion failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
