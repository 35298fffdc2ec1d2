mod whisperx;

pub use whisperx::{WhisperXConfig, WhisperXRecognizer};
