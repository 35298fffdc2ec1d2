use serde::{Deserialize, Serialize};

/// Structured recognizer output: time-aligned segments plus a flat word
/// sequence spanning the whole input.
///
/// Segments arrive in chronological, non-overlapping order and words fall
/// within their segment's bounds; this is guaranteed by the upstream
/// producer and not re-validated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub word_segments: Vec<Word>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// A single recognized word. Timing and score default to zero because the
/// recognizer omits them for punctuation-only entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Word {
    #[serde(rename = "word")]
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default, rename = "score")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}
