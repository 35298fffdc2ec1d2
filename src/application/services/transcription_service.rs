use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;

use crate::application::ports::{
    JobStore, JobStoreError, PollReply, RecognizeRequest, Recognizer,
};
use crate::application::services::{convert_transcript, WorkerPool};
use crate::domain::{Job, JobId, JobOutcome, OutputFormat, TaskKind, Transcript};

/// Per-request submission options resolved by the HTTP layer.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub language: Option<String>,
    pub diarize: bool,
    pub task: TaskKind,
    pub format: OutputFormat,
}

/// Server-wide diarization configuration. Diarization needs an access token
/// for the gated speaker models; without one it is unavailable no matter
/// what the request asks for.
#[derive(Debug, Clone)]
pub struct DiarizationPolicy {
    pub default_on: bool,
    pub token_configured: bool,
}

/// Glue between the HTTP layer, the worker pool, and the job store: admits
/// jobs, writes their terminal state back, and expires what nobody reads.
pub struct TranscriptionService {
    store: Arc<dyn JobStore>,
    recognizer: Arc<dyn Recognizer>,
    pool: Arc<WorkerPool>,
    diarization: DiarizationPolicy,
    retention: Duration,
    inflight: Arc<InflightJobs>,
}

impl TranscriptionService {
    pub fn new(
        store: Arc<dyn JobStore>,
        recognizer: Arc<dyn Recognizer>,
        pool: Arc<WorkerPool>,
        diarization: DiarizationPolicy,
        retention: Duration,
    ) -> Self {
        Self {
            store,
            recognizer,
            pool,
            diarization,
            retention,
            inflight: Arc::new(InflightJobs::default()),
        }
    }

    /// Records a `PENDING` job, hands the work to the pool, and schedules
    /// the job's expiry. Returns as soon as the job is admitted; it never
    /// waits on recognition.
    pub async fn submit(
        &self,
        audio: Bytes,
        request: SubmitRequest,
    ) -> Result<JobId, JobStoreError> {
        let job = Job::new(request.format.content_type().to_string());
        let id = job.id;
        self.store.create(&job).await?;

        tracing::info!(
            job_id = %id.as_uuid(),
            task = %request.task,
            format = %request.format,
            queued = self.pool.queued(),
            "Transcription job admitted"
        );

        let worker = tokio::spawn(Self::process(
            Arc::clone(&self.store),
            Arc::clone(&self.recognizer),
            Arc::clone(&self.pool),
            Arc::clone(&self.inflight),
            self.diarization.clone(),
            id,
            audio,
            request,
        ));
        self.inflight.register(id, worker.abort_handle());
        self.schedule_expiry(id);

        Ok(id)
    }

    pub async fn poll(&self, id: JobId) -> Result<PollReply, JobStoreError> {
        self.store.poll(id).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn process(
        store: Arc<dyn JobStore>,
        recognizer: Arc<dyn Recognizer>,
        pool: Arc<WorkerPool>,
        inflight: Arc<InflightJobs>,
        diarization: DiarizationPolicy,
        id: JobId,
        audio: Bytes,
        request: SubmitRequest,
    ) {
        let effective_diarize =
            (request.diarize || diarization.default_on) && diarization.token_configured;
        let target_format = request.format;
        // The recognizer's own text formats carry no speaker labels, so a
        // diarized job always requests the structured form and converts.
        let invoke_format = if effective_diarize {
            OutputFormat::Json
        } else {
            target_format
        };

        let recognize = RecognizeRequest {
            audio,
            language: request.language,
            diarize: request.diarize || diarization.default_on,
            task: request.task,
            format: invoke_format,
        };

        let result = pool.run(recognizer.recognize(recognize)).await;

        let outcome = match result {
            Ok(raw) if effective_diarize && target_format != OutputFormat::Json => {
                Self::convert_diarized(&raw, target_format)
            }
            Ok(raw) => JobOutcome::Completed(raw),
            Err(e) => {
                tracing::error!(job_id = %id.as_uuid(), error = %e, "Recognizer invocation failed");
                JobOutcome::Failed(e.to_string())
            }
        };

        if let Err(e) = store.complete(id, outcome).await {
            tracing::error!(job_id = %id.as_uuid(), error = %e, "Failed to record job outcome");
        }
        inflight.finish(id);
    }

    fn convert_diarized(raw: &str, format: OutputFormat) -> JobOutcome {
        match serde_json::from_str::<Transcript>(raw) {
            Ok(transcript) => match convert_transcript(&transcript, format) {
                Ok(text) => JobOutcome::Completed(text),
                Err(e) => JobOutcome::Failed(e.to_string()),
            },
            Err(e) => JobOutcome::Failed(format!("malformed recognizer output: {}", e)),
        }
    }

    /// Drops the job after the retention window, read or not, and cancels
    /// its task if still running. Cancellation is best-effort: a subprocess
    /// already past the window is interrupted, a finished-but-unread result
    /// simply discarded.
    fn schedule_expiry(&self, id: JobId) {
        let store = Arc::clone(&self.store);
        let inflight = Arc::clone(&self.inflight);
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            match store.remove(id).await {
                Ok(true) => tracing::info!(job_id = %id.as_uuid(), "Unread job expired"),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(job_id = %id.as_uuid(), error = %e, "Expiry removal failed")
                }
            }
            inflight.abort(id);
        });
    }

    /// Interval-driven sweep over the whole store, catching anything the
    /// per-job expiry timers miss.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let inflight = Arc::clone(&self.inflight);
        let retention = self.retention;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; nothing can be stale yet.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match store.sweep(retention).await {
                    Ok(expired) => {
                        for id in &expired {
                            inflight.abort(*id);
                        }
                        if !expired.is_empty() {
                            tracing::info!(count = expired.len(), "TTL sweep removed stale jobs");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "TTL sweep failed"),
                }
            }
        })
    }
}

/// Abort handles for running worker tasks, so expiry can interrupt them.
#[derive(Default)]
struct InflightJobs(Mutex<HashMap<JobId, AbortHandle>>);

impl InflightJobs {
    fn register(&self, id: JobId, handle: AbortHandle) {
        self.lock().insert(id, handle);
    }

    fn finish(&self, id: JobId) {
        self.lock().remove(&id);
    }

    fn abort(&self, id: JobId) {
        if let Some(handle) = self.lock().remove(&id) {
            handle.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, AbortHandle>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
