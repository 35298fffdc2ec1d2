use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::JobStatus;

/// One transcription request's tracked unit of async work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Content type negotiated at submission, fixed for the job's lifetime.
    pub content_type: String,
    /// Serialized output text when `Done`, error message when `Error`.
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(content_type: String) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            content_type,
            result: None,
            created_at: Utc::now(),
        }
    }

    /// Moves the job into its terminal state. Called exactly once per job by
    /// the completion path.
    pub fn finish(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Completed(text) => {
                self.status = JobStatus::Done;
                self.result = Some(text);
            }
            JobOutcome::Failed(message) => {
                self.status = JobStatus::Error;
                self.result = Some(message);
            }
        }
    }
}

/// Terminal result of a worker task, success or captured failure.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}
