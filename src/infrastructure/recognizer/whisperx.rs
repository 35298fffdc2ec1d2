use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use uuid::Uuid;

use crate::application::ports::{RecognizeRequest, Recognizer, RecognizerError};
use crate::infrastructure::process_output::drain_lines;

/// Fixed compute precision passed to every invocation.
const COMPUTE_TYPE: &str = "int8";
const REDACTED: &str = "***";

#[derive(Debug, Clone)]
pub struct WhisperXConfig {
    pub executable: String,
    /// Directory for the temporary input file and the recognizer's output.
    pub workdir: PathBuf,
    pub model: Option<String>,
    /// Hugging Face token for the gated speaker models; gates `--diarize`.
    pub hf_token: Option<String>,
    pub threads: Option<u32>,
}

impl Default for WhisperXConfig {
    fn default() -> Self {
        Self {
            executable: "whisperx".to_string(),
            workdir: PathBuf::from("/tmp"),
            model: None,
            hf_token: None,
            threads: None,
        }
    }
}

/// Invokes the whisperX command-line tool as a subprocess.
///
/// Each invocation writes exactly two filesystem entries under the working
/// directory, both named from a fresh UUID prefix so concurrent jobs never
/// alias, and removes both before returning.
pub struct WhisperXRecognizer {
    config: WhisperXConfig,
}

impl WhisperXRecognizer {
    pub fn new(config: WhisperXConfig) -> Self {
        Self { config }
    }

    async fn run(
        &self,
        source_file: &Path,
        result_file: &Path,
        request: &RecognizeRequest,
    ) -> Result<String, RecognizerError> {
        let args = self.build_args(source_file, request);
        tracing::debug!(command = %self.redacted(&args), "Spawning recognizer process");

        let mut child = Command::new(&self.config.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(stdout) = child.stdout.take() {
            drain_lines(stdout, "recognizer stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            drain_lines(stderr, "recognizer stderr");
        }

        let status = child.wait().await?;
        tracing::debug!(code = status.code().unwrap_or(-1), "Recognizer process exited");

        if !status.success() {
            return Err(RecognizerError::ProcessFailed {
                code: status.code().unwrap_or(-1),
            });
        }

        match tokio::fs::read_to_string(result_file).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                RecognizerError::ResultFileMissing(result_file.display().to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    fn build_args(&self, source_file: &Path, request: &RecognizeRequest) -> Vec<String> {
        let mut args = vec![
            source_file.display().to_string(),
            "--compute_type".to_string(),
            COMPUTE_TYPE.to_string(),
            "--output_dir".to_string(),
            self.config.workdir.display().to_string(),
            "--task".to_string(),
            request.task.as_str().to_string(),
            "--output_format".to_string(),
            request.format.as_str().to_string(),
        ];

        if let Some(language) = non_blank(request.language.as_deref()) {
            args.push("--language".to_string());
            args.push(language.to_string());
        }
        if let Some(model) = non_blank(self.config.model.as_deref()) {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        if let Some(threads) = self.config.threads {
            args.push("--threads".to_string());
            args.push(threads.to_string());
        }

        let token = non_blank(self.config.hf_token.as_deref());
        if let Some(token) = token {
            args.push("--hf_token".to_string());
            args.push(token.to_string());
        }
        // Diarization needs the gated speaker models; without a token the
        // job proceeds without speaker labels.
        if request.diarize && token.is_some() {
            args.push("--diarize".to_string());
        }

        args
    }

    /// Command line for logging, with the access token blanked out. The
    /// token still reaches the subprocess as a literal argument.
    fn redacted(&self, args: &[String]) -> String {
        let joined = args.join(" ");
        match non_blank(self.config.hf_token.as_deref()) {
            Some(token) => joined.replace(token, REDACTED),
            None => joined,
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for WhisperXRecognizer {
    async fn recognize(&self, request: RecognizeRequest) -> Result<String, RecognizerError> {
        let prefix = Uuid::new_v4().to_string();
        let source_file = self.config.workdir.join(format!("{}.wav", prefix));
        let result_file = self
            .config
            .workdir
            .join(format!("{}.{}", prefix, request.format.extension()));

        tracing::info!(
            task = %request.task,
            language = request.language.as_deref().unwrap_or("auto"),
            source = %source_file.display(),
            format = %request.format,
            "Invoking recognizer"
        );

        tokio::fs::write(&source_file, &request.audio).await?;

        let outcome = self.run(&source_file, &result_file, &request).await;

        // Both attempted regardless of the invocation's outcome; a leaked
        // temp file is an error in its own right even when recognition
        // succeeded.
        let source_cleanup = remove_temp_file(&source_file).await;
        let result_cleanup = remove_temp_file(&result_file).await;

        let text = outcome?;
        source_cleanup?;
        result_cleanup?;
        Ok(text)
    }
}

async fn remove_temp_file(path: &Path) -> Result<(), RecognizerError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RecognizerError::CleanupFailed(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
