use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{OutputFormat, TaskKind};

/// Input for a single recognizer invocation. Lives only for the duration of
/// one subprocess call.
#[derive(Debug, Clone)]
pub struct RecognizeRequest {
    /// Audio in WAV format, 16 kHz mono PCM.
    pub audio: Bytes,
    /// Language spoken in the audio; `None` lets the recognizer detect it.
    pub language: Option<String>,
    pub diarize: bool,
    pub task: TaskKind,
    pub format: OutputFormat,
}

#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Runs the external recognizer and returns the raw result file content.
    async fn recognize(&self, request: RecognizeRequest) -> Result<String, RecognizerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("recognizer exited with code {code}")]
    ProcessFailed { code: i32 },
    /// Zero exit but no output artifact; invariant violation, fatal for the job.
    #[error("result file not found: {0}")]
    ResultFileMissing(String),
    #[error("temp file cleanup failed: {0}")]
    CleanupFailed(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
