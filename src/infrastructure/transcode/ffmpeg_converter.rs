use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::application::ports::{AudioConverter, AudioConverterError};
use crate::infrastructure::process_output::drain_lines;

/// Pipes audio through a local ffmpeg to produce the 16 kHz mono PCM WAV
/// the recognizer expects.
pub struct FfmpegConverter {
    executable: String,
}

impl FfmpegConverter {
    pub fn new(executable: String) -> Self {
        Self { executable }
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new("ffmpeg".to_string())
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert_to_wav(&self, source: Bytes) -> Result<Vec<u8>, AudioConverterError> {
        tracing::info!(bytes = source.len(), "Converting audio to recognizer input format");

        let mut child = Command::new(&self.executable)
            .args([
                "-i", "pipe:", "-loglevel", "quiet", "-acodec", "pcm_s16le", "-ac", "1", "-ar",
                "16000", "-f", "wav", "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AudioConverterError::Io(std::io::Error::other("transcoder stdin unavailable")))?;
        if let Some(stderr) = child.stderr.take() {
            drain_lines(stderr, "transcoder stderr");
        }

        // Stdin gets its own task: feeding input and collecting output from
        // the same task deadlocks once either pipe buffer fills.
        let writer = tokio::spawn(async move {
            let written = stdin.write_all(&source).await;
            drop(stdin);
            written
        });

        let mut converted = Vec::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_end(&mut converted).await?;
        }

        let status = child.wait().await?;
        if let Ok(Err(e)) = writer.await {
            // ffmpeg may close stdin early once it has seen the full stream.
            tracing::debug!(error = %e, "Transcoder stdin closed early");
        }

        tracing::info!(
            code = status.code().unwrap_or(-1),
            bytes = converted.len(),
            "Audio conversion finished"
        );

        if !status.success() {
            return Err(AudioConverterError::ProcessFailed {
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(converted)
    }
}
