use std::fmt;

/// Output file format produced by the recognizer CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Txt,
    Srt,
    Vtt,
    Tsv,
    Aud,
}

impl OutputFormat {
    /// Maps the requested content type to an output format. Unrecognized
    /// types fall back to plain text.
    pub fn from_accept(accept: &str) -> Self {
        let media_type = accept.split(';').next().unwrap_or("").trim();
        match media_type {
            "application/json" => Self::Json,
            "text/plain" => Self::Txt,
            "text/srt" => Self::Srt,
            "text/vtt" => Self::Vtt,
            "text/tsv" => Self::Tsv,
            "text/aud" => Self::Aud,
            _ => Self::Txt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Tsv => "tsv",
            Self::Aud => "aud",
        }
    }

    /// Extension of the result file the recognizer writes.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Canonical content type used when serving a finished job.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Txt => "text/plain",
            Self::Srt => "text/srt",
            Self::Vtt => "text/vtt",
            Self::Tsv => "text/tsv",
            Self::Aud => "text/aud",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
