use async_trait::async_trait;
use bytes::Bytes;

/// Converts arbitrary audio into the input format the recognizer requires.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert_to_wav(&self, source: Bytes) -> Result<Vec<u8>, AudioConverterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioConverterError {
    #[error("transcoder exited with code {code}")]
    ProcessFailed { code: i32 },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
