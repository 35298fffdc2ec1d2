use crate::domain::{OutputFormat, Transcript};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(OutputFormat),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Renders a structured transcript into one of the downstream text formats.
/// Deterministic: identical input always yields byte-identical output.
pub fn convert_transcript(
    transcript: &Transcript,
    format: OutputFormat,
) -> Result<String, ConvertError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(transcript)?),
        OutputFormat::Txt => Ok(render_plain_text(transcript)),
        other => Err(ConvertError::UnsupportedFormat(other)),
    }
}

/// Plain-text rendering. Consecutive segments of the same speaker share one
/// `"speaker:"` header; a speaker switch inserts a blank separator line.
/// Segments ending in sentence punctuation get one trailing space so
/// consecutive sentences join with exactly one space; segments without it
/// run together, matching the recognizer's own text output.
fn render_plain_text(transcript: &Transcript) -> String {
    let mut out = String::new();
    let mut current_speaker = "";

    for segment in &transcript.segments {
        if let Some(speaker) = segment.speaker.as_deref() {
            if !speaker.trim().is_empty() && speaker != current_speaker {
                if !out.is_empty() {
                    out.push_str("\n\n");
                }
                out.push_str(speaker);
                out.push_str(":\n");
                current_speaker = speaker;
            }
        }

        out.push_str(segment.text.trim());
        if out.ends_with(['!', '?', '.']) {
            out.push(' ');
        }
    }

    out
}
