use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration, resolved from the environment with documented
/// defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub recognizer: RecognizerSettings,
    pub transcode: TranscodeSettings,
    pub jobs: JobSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_body_mb: usize,
}

#[derive(Debug, Clone)]
pub struct RecognizerSettings {
    /// Recognizer executable to use.
    pub executable: String,
    /// Number of parallel recognizer instances; further jobs get queued.
    pub parallel_instances: usize,
    /// Recognizer model (small, medium, large-v2); passed only when set.
    pub model: Option<String>,
    /// Hugging Face access token for the gated speaker models.
    pub hf_token: Option<String>,
    /// Threads used for CPU inference; passed only when set.
    pub threads: Option<u32>,
    /// Server-wide default for speaker diarization.
    pub diarize: bool,
    pub workdir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    pub ffmpeg_executable: String,
}

#[derive(Debug, Clone)]
pub struct JobSettings {
    /// How long an unread job is kept before the TTL sweep drops it.
    pub retention_hours: u64,
    pub sweep_interval_minutes: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parsed("SERVER_PORT", 8080),
                max_body_mb: env_parsed("SERVER_MAX_BODY_MB", 512),
            },
            recognizer: RecognizerSettings {
                executable: env_or("WHISPERX_EXECUTABLE", "whisperx"),
                parallel_instances: env_parsed("WHISPERX_PARALLEL_INSTANCES", 1),
                model: env_opt("WHISPERX_MODEL"),
                hf_token: env_opt("WHISPERX_HF_TOKEN"),
                threads: env_opt("WHISPERX_THREADS").and_then(|v| v.parse().ok()),
                diarize: env_flag("WHISPERX_DIARIZE"),
                workdir: PathBuf::from(env_or("WHISPERX_WORKDIR", "/tmp")),
            },
            transcode: TranscodeSettings {
                ffmpeg_executable: env_or("FFMPEG_EXECUTABLE", "ffmpeg"),
            },
            jobs: JobSettings {
                retention_hours: env_parsed("JOB_RETENTION_HOURS", 48),
                sweep_interval_minutes: env_parsed("JOB_SWEEP_INTERVAL_MINUTES", 60),
            },
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false)
}
