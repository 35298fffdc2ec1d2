mod transcript_converter;
mod transcription_service;
mod worker_pool;

pub use transcript_converter::{convert_transcript, ConvertError};
pub use transcription_service::{DiarizationPolicy, SubmitRequest, TranscriptionService};
pub use worker_pool::WorkerPool;
