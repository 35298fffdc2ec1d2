use std::sync::Arc;

use crate::application::ports::AudioConverter;
use crate::application::services::{TranscriptionService, WorkerPool};

#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub audio_converter: Arc<dyn AudioConverter>,
    pub worker_pool: Arc<WorkerPool>,
}
