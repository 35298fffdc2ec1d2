mod convert;
mod health;
mod status;
mod transcribe;

pub use convert::convert_handler;
pub use health::health_handler;
pub use status::transcription_status_handler;
pub use transcribe::{transcribe_handler, TranscriptionAccepted};
