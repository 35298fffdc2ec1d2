use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Job, JobId, JobOutcome};

/// Maps opaque job identifiers to in-flight or completed work.
///
/// Backed by a process-local map in single-instance deployments; the port
/// exists so multi-instance deployments can substitute an external store.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), JobStoreError>;

    /// Writes the terminal state for a job. A job that already expired is
    /// silently discarded together with its outcome.
    async fn complete(&self, id: JobId, outcome: JobOutcome) -> Result<(), JobStoreError>;

    /// Looks up a job's current state. A terminal job is removed atomically
    /// with the read, so at most one caller observes its result.
    async fn poll(&self, id: JobId) -> Result<PollReply, JobStoreError>;

    /// Returns whether a job was actually present and removed.
    async fn remove(&self, id: JobId) -> Result<bool, JobStoreError>;

    /// Drops every job older than `retention` and returns the removed ids.
    async fn sweep(&self, retention: Duration) -> Result<Vec<JobId>, JobStoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollReply {
    /// Unknown, expired, or already-consumed id.
    NotFound,
    Pending,
    Finished { content_type: String, body: String },
    Failed { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
