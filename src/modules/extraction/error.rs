use thiserror::Error;

/// Failure modes of the media-to-text pipeline.
///
/// These never reach an HTTP caller directly: ingestion has already
/// returned by the time extraction runs, so every variant ends up as a
/// diagnostic string on the attachment row.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0} API key not configured")]
    MissingCredentials(&'static str),

    /// Structured error body returned by an external service
    #[error("{service} API error: {message} ({detail})")]
    Api {
        service: &'static str,
        message: String,
        detail: String,
    },

    /// Non-2xx response whose body could not be parsed as a structured error
    #[error("API request failed with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    InvalidResponse(String),

    #[error("no text detected in {0}")]
    NoTextDetected(&'static str),

    /// The vision service rejected the raw document payload as an image
    #[error("PDF-Format wird von der Texterkennung nicht direkt unterstützt. Bitte lade die Seiten als Bilder hoch.")]
    UnsupportedDocumentFormat,

    /// Both document strategies exhausted below the confidence floor
    #[error("PDF-Text-Extraktion fehlgeschlagen. Bitte konvertiere die PDF-Seiten zu Bildern (PNG/JPG) und lade diese stattdessen hoch, oder kopiere den Text manuell in die Notiz.")]
    DocumentUnreadable,
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
