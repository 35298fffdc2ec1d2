use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use scribed::application::ports::{
    JobStore, PollReply, RecognizeRequest, Recognizer, RecognizerError,
};
use scribed::application::services::{
    DiarizationPolicy, SubmitRequest, TranscriptionService, WorkerPool,
};
use scribed::domain::{OutputFormat, TaskKind};
use scribed::infrastructure::store::InMemoryJobStore;

const DIARIZED_JSON: &str = r#"{
    "segments": [
        {"start": 0.0, "end": 1.0, "text": " Hi. ", "speaker": "A", "words": []},
        {"start": 1.0, "end": 2.0, "text": "There", "speaker": "A", "words": []},
        {"start": 2.0, "end": 3.0, "text": "Yo", "speaker": "B", "words": []}
    ],
    "word_segments": []
}"#;

/// Records how many invocations overlap, to observe pool serialization.
struct CountingRecognizer {
    active: AtomicUsize,
    max_active: AtomicUsize,
    delay: Duration,
}

impl CountingRecognizer {
    fn new(delay: Duration) -> Self {
        Self {
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for CountingRecognizer {
    async fn recognize(&self, _request: RecognizeRequest) -> Result<String, RecognizerError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok("done".to_string())
    }
}

/// Stores the last request it saw and replies with a fixed body.
struct CapturingRecognizer {
    last: Mutex<Option<RecognizeRequest>>,
    reply: &'static str,
}

impl CapturingRecognizer {
    fn new(reply: &'static str) -> Self {
        Self {
            last: Mutex::new(None),
            reply,
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for CapturingRecognizer {
    async fn recognize(&self, request: RecognizeRequest) -> Result<String, RecognizerError> {
        *self.last.lock().unwrap() = Some(request);
        Ok(self.reply.to_string())
    }
}

struct BlockedRecognizer;

#[async_trait::async_trait]
impl Recognizer for BlockedRecognizer {
    async fn recognize(&self, _request: RecognizeRequest) -> Result<String, RecognizerError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

fn service_with(
    recognizer: Arc<dyn Recognizer>,
    pool_size: usize,
    diarization: DiarizationPolicy,
    retention: Duration,
) -> Arc<TranscriptionService> {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let pool = Arc::new(WorkerPool::new(pool_size));
    Arc::new(TranscriptionService::new(
        store, recognizer, pool, diarization, retention,
    ))
}

fn no_diarization() -> DiarizationPolicy {
    DiarizationPolicy {
        default_on: false,
        token_configured: false,
    }
}

fn request(diarize: bool, format: OutputFormat) -> SubmitRequest {
    SubmitRequest {
        language: Some("en".to_string()),
        diarize,
        task: TaskKind::Transcribe,
        format,
    }
}

async fn poll_until_terminal(
    service: &TranscriptionService,
    id: scribed::domain::JobId,
) -> PollReply {
    for _ in 0..200 {
        let reply = service.poll(id).await.unwrap();
        match reply {
            PollReply::Pending => tokio::time::sleep(Duration::from_millis(10)).await,
            terminal => return terminal,
        }
    }
    panic!("job never reached a terminal state");
}

#[tokio::test(flavor = "multi_thread")]
async fn given_pool_of_one_when_two_jobs_submitted_then_invocations_never_overlap() {
    let recognizer = Arc::new(CountingRecognizer::new(Duration::from_millis(50)));
    let service = service_with(
        Arc::clone(&recognizer) as Arc<dyn Recognizer>,
        1,
        no_diarization(),
        Duration::from_secs(3600),
    );

    let first = service
        .submit(Bytes::from_static(b"a"), request(false, OutputFormat::Txt))
        .await
        .unwrap();
    let second = service
        .submit(Bytes::from_static(b"b"), request(false, OutputFormat::Txt))
        .await
        .unwrap();

    let first_reply = poll_until_terminal(&service, first).await;
    let second_reply = poll_until_terminal(&service, second).await;

    assert!(matches!(first_reply, PollReply::Finished { .. }));
    assert!(matches!(second_reply, PollReply::Finished { .. }));
    assert_eq!(recognizer.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_completed_job_when_polled_twice_then_second_poll_sees_nothing() {
    let service = service_with(
        Arc::new(CapturingRecognizer::new("hello")),
        1,
        no_diarization(),
        Duration::from_secs(3600),
    );

    let id = service
        .submit(Bytes::from_static(b"a"), request(false, OutputFormat::Txt))
        .await
        .unwrap();

    let reply = poll_until_terminal(&service, id).await;
    assert_eq!(
        reply,
        PollReply::Finished {
            content_type: "text/plain".to_string(),
            body: "hello".to_string(),
        }
    );
    assert_eq!(service.poll(id).await.unwrap(), PollReply::NotFound);
}

#[tokio::test]
async fn given_short_retention_when_job_never_read_then_it_expires() {
    let service = service_with(
        Arc::new(BlockedRecognizer),
        1,
        no_diarization(),
        Duration::from_millis(50),
    );

    let id = service
        .submit(Bytes::from_static(b"a"), request(false, OutputFormat::Txt))
        .await
        .unwrap();

    assert_eq!(service.poll(id).await.unwrap(), PollReply::Pending);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(service.poll(id).await.unwrap(), PollReply::NotFound);
}

#[tokio::test]
async fn given_sweeper_running_when_retention_elapses_then_unread_jobs_vanish() {
    let service = service_with(
        Arc::new(BlockedRecognizer),
        1,
        no_diarization(),
        Duration::from_millis(1),
    );
    let _sweeper = service.spawn_sweeper(Duration::from_millis(20));

    let id = service
        .submit(Bytes::from_static(b"a"), request(false, OutputFormat::Txt))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(service.poll(id).await.unwrap(), PollReply::NotFound);
}

#[tokio::test]
async fn given_diarization_active_when_format_is_txt_then_json_output_is_converted() {
    let recognizer = Arc::new(CapturingRecognizer::new(DIARIZED_JSON));
    let service = service_with(
        Arc::clone(&recognizer) as Arc<dyn Recognizer>,
        1,
        DiarizationPolicy {
            default_on: false,
            token_configured: true,
        },
        Duration::from_secs(3600),
    );

    let id = service
        .submit(Bytes::from_static(b"a"), request(true, OutputFormat::Txt))
        .await
        .unwrap();

    let reply = poll_until_terminal(&service, id).await;
    assert_eq!(
        reply,
        PollReply::Finished {
            content_type: "text/plain".to_string(),
            body: "A:\nHi. There\n\nB:\nYo".to_string(),
        }
    );

    // The recognizer itself was asked for the structured form.
    let captured = recognizer.last.lock().unwrap().clone().unwrap();
    assert_eq!(captured.format, OutputFormat::Json);
    assert!(captured.diarize);
}

#[tokio::test]
async fn given_diarization_active_when_format_unconvertible_then_job_fails() {
    let service = service_with(
        Arc::new(CapturingRecognizer::new(DIARIZED_JSON)),
        1,
        DiarizationPolicy {
            default_on: false,
            token_configured: true,
        },
        Duration::from_secs(3600),
    );

    let id = service
        .submit(Bytes::from_static(b"a"), request(true, OutputFormat::Srt))
        .await
        .unwrap();

    match poll_until_terminal(&service, id).await {
        PollReply::Failed { message } => {
            assert!(message.contains("unsupported output format"));
        }
        other => panic!("expected failed job, got {:?}", other),
    }
}

#[tokio::test]
async fn given_no_token_when_diarization_requested_then_job_proceeds_undiarized() {
    let recognizer = Arc::new(CapturingRecognizer::new("plain text"));
    let service = service_with(
        Arc::clone(&recognizer) as Arc<dyn Recognizer>,
        1,
        no_diarization(),
        Duration::from_secs(3600),
    );

    let id = service
        .submit(Bytes::from_static(b"a"), request(true, OutputFormat::Txt))
        .await
        .unwrap();

    let reply = poll_until_terminal(&service, id).await;
    assert!(matches!(reply, PollReply::Finished { .. }));

    // No token configured: the recognizer keeps the requested format rather
    // than detouring through the structured form.
    let captured = recognizer.last.lock().unwrap().clone().unwrap();
    assert_eq!(captured.format, OutputFormat::Txt);
}

#[tokio::test]
async fn given_translate_task_when_submitted_then_recognizer_sees_it() {
    let recognizer = Arc::new(CapturingRecognizer::new("translated"));
    let service = service_with(
        Arc::clone(&recognizer) as Arc<dyn Recognizer>,
        1,
        no_diarization(),
        Duration::from_secs(3600),
    );

    let id = service
        .submit(
            Bytes::from_static(b"a"),
            SubmitRequest {
                language: None,
                diarize: false,
                task: TaskKind::Translate,
                format: OutputFormat::Txt,
            },
        )
        .await
        .unwrap();

    poll_until_terminal(&service, id).await;
    let captured = recognizer.last.lock().unwrap().clone().unwrap();
    assert_eq!(captured.task, TaskKind::Translate);
    assert_eq!(captured.language, None);
}
