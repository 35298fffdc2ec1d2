use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::{JobStore, JobStoreError, PollReply};
use crate::domain::{Job, JobId, JobOutcome, JobStatus};

/// Job store backed by a process-local map, for single-instance deployments.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<JobId, Job>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &Job) -> Result<(), JobStoreError> {
        self.jobs().insert(job.id, job.clone());
        Ok(())
    }

    async fn complete(&self, id: JobId, outcome: JobOutcome) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs();
        match jobs.get_mut(&id) {
            Some(job) => job.finish(outcome),
            // Expired before the worker finished; the result is discarded.
            None => {
                tracing::debug!(job_id = %id.as_uuid(), "Dropping outcome for expired job")
            }
        }
        Ok(())
    }

    async fn poll(&self, id: JobId) -> Result<PollReply, JobStoreError> {
        let mut jobs = self.jobs();
        let Some(job) = jobs.get(&id) else {
            return Ok(PollReply::NotFound);
        };

        let reply = match job.status {
            JobStatus::Pending => PollReply::Pending,
            JobStatus::Done => PollReply::Finished {
                content_type: job.content_type.clone(),
                body: job.result.clone().unwrap_or_default(),
            },
            JobStatus::Error => PollReply::Failed {
                message: job.result.clone().unwrap_or_default(),
            },
        };

        // Remove-on-read, atomic under the map lock: at most one caller
        // observes a terminal result.
        if job.status.is_terminal() {
            jobs.remove(&id);
        }

        Ok(reply)
    }

    async fn remove(&self, id: JobId) -> Result<bool, JobStoreError> {
        Ok(self.jobs().remove(&id).is_some())
    }

    async fn sweep(&self, retention: Duration) -> Result<Vec<JobId>, JobStoreError> {
        let Ok(window) = chrono::Duration::from_std(retention) else {
            return Ok(Vec::new());
        };
        let now = Utc::now();

        let mut jobs = self.jobs();
        let expired: Vec<JobId> = jobs
            .iter()
            .filter(|(_, job)| now.signed_duration_since(job.created_at) >= window)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            jobs.remove(id);
        }

        Ok(expired)
    }
}
