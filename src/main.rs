use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use scribed::application::ports::{AudioConverter, JobStore, Recognizer};
use scribed::application::services::{DiarizationPolicy, TranscriptionService, WorkerPool};
use scribed::infrastructure::observability::{init_tracing, TracingConfig};
use scribed::infrastructure::recognizer::{WhisperXConfig, WhisperXRecognizer};
use scribed::infrastructure::store::InMemoryJobStore;
use scribed::infrastructure::transcode::FfmpegConverter;
use scribed::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    init_tracing(TracingConfig::default(), settings.server.port);

    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let worker_pool = Arc::new(WorkerPool::new(settings.recognizer.parallel_instances));
    let recognizer: Arc<dyn Recognizer> = Arc::new(WhisperXRecognizer::new(WhisperXConfig {
        executable: settings.recognizer.executable.clone(),
        workdir: settings.recognizer.workdir.clone(),
        model: settings.recognizer.model.clone(),
        hf_token: settings.recognizer.hf_token.clone(),
        threads: settings.recognizer.threads,
    }));
    let audio_converter: Arc<dyn AudioConverter> =
        Arc::new(FfmpegConverter::new(settings.transcode.ffmpeg_executable.clone()));

    let diarization = DiarizationPolicy {
        default_on: settings.recognizer.diarize,
        token_configured: settings
            .recognizer
            .hf_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty()),
    };
    let retention = Duration::from_secs(settings.jobs.retention_hours * 60 * 60);

    let transcription_service = Arc::new(TranscriptionService::new(
        store,
        recognizer,
        Arc::clone(&worker_pool),
        diarization,
        retention,
    ));
    let _sweeper = transcription_service
        .spawn_sweeper(Duration::from_secs(settings.jobs.sweep_interval_minutes * 60));

    let state = AppState {
        transcription_service,
        audio_converter,
        worker_pool,
    };
    let router = create_router(state, settings.server.max_body_mb * 1024 * 1024);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
