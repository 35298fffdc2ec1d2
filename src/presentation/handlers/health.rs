use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub workers: WorkerSnapshot,
}

#[derive(Serialize)]
pub struct WorkerSnapshot {
    pub capacity: usize,
    pub active: usize,
    pub queued: usize,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let pool = &state.worker_pool;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            workers: WorkerSnapshot {
                capacity: pool.capacity(),
                active: pool.active(),
                queued: pool.queued(),
            },
        }),
    )
}
