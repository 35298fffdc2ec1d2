pub mod observability;
pub mod process_output;
pub mod recognizer;
pub mod store;
pub mod transcode;
