mod audio_converter;
mod job_store;
mod recognizer;

pub use audio_converter::{AudioConverter, AudioConverterError};
pub use job_store::{JobStore, JobStoreError, PollReply};
pub use recognizer::{RecognizeRequest, Recognizer, RecognizerError};
