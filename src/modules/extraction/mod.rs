//! Asynchronous media-to-text extraction pipeline
//!
//! One entry point, [`MediaConverter::convert`], routes by [`MediaKind`]:
//! audio goes to speech recognition, images to vision OCR, documents
//! through the two-stage structural/optical extractor.

pub mod document;
pub mod error;
pub mod speech;
pub mod vision;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::config::{SpeechConfig, VisionConfig};
use document::DocumentExtractor;
use error::ExtractResult;
use speech::{SpeechToText, WhisperTranscriber};
use vision::{GoogleVisionClient, VisionTextDetection};

/// Recognition services can be slow on large media
const EXTERNAL_CALL_TIMEOUT_SECS: u64 = 120;

/// Media kind deciding which extractor handles an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Document => "document",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "audio" => Some(MediaKind::Audio),
            "image" => Some(MediaKind::Image),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }

    /// Resolve the kind for an upload: an explicitly declared kind wins,
    /// otherwise sniff from MIME type and file name. None means the upload
    /// is unsupported and must be rejected before any side effect.
    pub fn detect(declared: Option<&str>, mime_type: &str, file_name: &str) -> Option<Self> {
        if let Some(declared) = declared.map(str::trim).filter(|s| !s.is_empty()) {
            return Self::parse(declared);
        }

        let mime = mime_type.to_ascii_lowercase();
        if mime.contains("audio") {
            Some(MediaKind::Audio)
        } else if mime.contains("image") {
            Some(MediaKind::Image)
        } else if mime.contains("pdf") || file_name.to_ascii_lowercase().ends_with(".pdf") {
            Some(MediaKind::Document)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing table from media kind to extractor
pub struct MediaConverter {
    speech: Arc<dyn SpeechToText>,
    vision: Arc<dyn VisionTextDetection>,
    document: DocumentExtractor,
}

impl MediaConverter {
    pub fn new(speech: Arc<dyn SpeechToText>, vision: Arc<dyn VisionTextDetection>) -> Self {
        let document = DocumentExtractor::new(Arc::clone(&vision));
        Self {
            speech,
            vision,
            document,
        }
    }

    /// Build the production converter with its own HTTP client
    pub fn from_config(speech_config: &SpeechConfig, vision_config: &VisionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(EXTERNAL_CALL_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        let speech: Arc<dyn SpeechToText> =
            Arc::new(WhisperTranscriber::new(speech_config, client.clone()));
        let vision: Arc<dyn VisionTextDetection> =
            Arc::new(GoogleVisionClient::new(vision_config, client));

        Self::new(speech, vision)
    }

    pub async fn convert(
        &self,
        kind: MediaKind,
        data: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> ExtractResult<String> {
        match kind {
            MediaKind::Audio => self.speech.transcribe(data, file_name).await,
            MediaKind::Image => self.vision.annotate_image(data, mime_type).await,
            MediaKind::Document => self.document.extract(data).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::extraction::error::ExtractError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSpeech {
        transcript: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechToText for StubSpeech {
        async fn transcribe(&self, _data: &[u8], _file_name: &str) -> ExtractResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.transcript.clone())
        }
    }

    enum DocumentBehavior {
        Text(String),
        Unsupported,
    }

    struct StubVision {
        image_text: Option<String>,
        document: DocumentBehavior,
        image_calls: AtomicUsize,
        document_calls: AtomicUsize,
    }

    impl StubVision {
        fn new(image_text: Option<&str>, document: DocumentBehavior) -> Self {
            Self {
                image_text: image_text.map(String::from),
                document,
                image_calls: AtomicUsize::new(0),
                document_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VisionTextDetection for StubVision {
        async fn annotate_image(&self, _data: &[u8], _mime_type: &str) -> ExtractResult<String> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            self.image_text
                .clone()
                .ok_or(ExtractError::NoTextDetected("image"))
        }

        async fn annotate_document(&self, _data: &[u8]) -> ExtractResult<String> {
            self.document_calls.fetch_add(1, Ordering::SeqCst);
            match &self.document {
                DocumentBehavior::Text(t) => Ok(t.clone()),
                DocumentBehavior::Unsupported => Err(ExtractError::UnsupportedDocumentFormat),
            }
        }
    }

    fn converter(speech: Arc<StubSpeech>, vision: Arc<StubVision>) -> MediaConverter {
        MediaConverter::new(speech, vision)
    }

    fn stub_speech(transcript: &str) -> Arc<StubSpeech> {
        Arc::new(StubSpeech {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    const LONG_OPTICAL_TEXT: &str =
        "Dieser optisch erkannte Text ist deutlich laenger als fuenfzig Zeichen und zaehlt daher als Erfolg.";

    #[tokio::test]
    async fn audio_routes_to_the_transcriber() {
        let speech = stub_speech("Guten Morgen");
        let vision = Arc::new(StubVision::new(None, DocumentBehavior::Unsupported));
        let conv = converter(Arc::clone(&speech), Arc::clone(&vision));

        let text = conv
            .convert(MediaKind::Audio, b"mp3-bytes", "speech.mp3", "audio/mpeg")
            .await
            .unwrap();

        assert_eq!(text, "Guten Morgen");
        assert_eq!(speech.calls.load(Ordering::SeqCst), 1);
        assert_eq!(vision.image_calls.load(Ordering::SeqCst), 0);
        assert_eq!(vision.document_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn image_routes_to_vision_text_detection() {
        let speech = stub_speech("unused");
        let vision = Arc::new(StubVision::new(
            Some("Einkaufsliste"),
            DocumentBehavior::Unsupported,
        ));
        let conv = converter(Arc::clone(&speech), Arc::clone(&vision));

        let text = conv
            .convert(MediaKind::Image, b"png-bytes", "scan.png", "image/png")
            .await
            .unwrap();

        assert_eq!(text, "Einkaufsliste");
        assert_eq!(vision.image_calls.load(Ordering::SeqCst), 1);
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn image_without_text_fails() {
        let speech = stub_speech("unused");
        let vision = Arc::new(StubVision::new(None, DocumentBehavior::Unsupported));
        let conv = converter(speech, Arc::clone(&vision));

        let err = conv
            .convert(MediaKind::Image, b"png-bytes", "scan.png", "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::NoTextDetected("image")));
    }

    #[tokio::test]
    async fn structural_document_parse_skips_the_optical_fallback() {
        let speech = stub_speech("unused");
        let vision = Arc::new(StubVision::new(None, DocumentBehavior::Unsupported));
        let conv = converter(speech, Arc::clone(&vision));

        let doc = b"BT\n(Dieser eingebettete Absatz ist lang genug, um die Schwelle von fuenfzig Zeichen zu ueberschreiten.) Tj\nET";
        let text = conv
            .convert(MediaKind::Document, doc, "brief.pdf", "application/pdf")
            .await
            .unwrap();

        assert!(text.contains("eingebettete Absatz"));
        assert_eq!(vision.document_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_structural_parse_triggers_exactly_one_optical_call() {
        let speech = stub_speech("unused");
        let vision = Arc::new(StubVision::new(
            None,
            DocumentBehavior::Text(LONG_OPTICAL_TEXT.to_string()),
        ));
        let conv = converter(speech, Arc::clone(&vision));

        let doc = b"BT\n(kurz) Tj\nET";
        let text = conv
            .convert(MediaKind::Document, doc, "scan.pdf", "application/pdf")
            .await
            .unwrap();

        assert_eq!(text, LONG_OPTICAL_TEXT);
        assert_eq!(vision.document_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn document_fails_when_both_strategies_stay_below_the_floor() {
        let speech = stub_speech("unused");
        let vision = Arc::new(StubVision::new(
            None,
            DocumentBehavior::Text("zu wenig".to_string()),
        ));
        let conv = converter(speech, Arc::clone(&vision));

        let err = conv
            .convert(MediaKind::Document, b"leeres dokument", "x.pdf", "application/pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::DocumentUnreadable));
        assert_eq!(vision.document_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_document_format_is_surfaced_distinctly() {
        let speech = stub_speech("unused");
        let vision = Arc::new(StubVision::new(None, DocumentBehavior::Unsupported));
        let conv = converter(speech, Arc::clone(&vision));

        let err = conv
            .convert(MediaKind::Document, b"odd bytes", "x.pdf", "application/pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::UnsupportedDocumentFormat));
    }

    #[test]
    fn declared_kind_wins_over_mime_sniffing() {
        assert_eq!(
            MediaKind::detect(Some("audio"), "image/png", "x.png"),
            Some(MediaKind::Audio)
        );
        assert_eq!(MediaKind::detect(Some("video"), "image/png", "x.png"), None);
    }

    #[test]
    fn kind_is_sniffed_from_mime_type_and_suffix() {
        assert_eq!(
            MediaKind::detect(None, "audio/mpeg", "memo.mp3"),
            Some(MediaKind::Audio)
        );
        assert_eq!(
            MediaKind::detect(None, "image/jpeg", "scan.jpg"),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::detect(None, "application/pdf", "brief"),
            Some(MediaKind::Document)
        );
        assert_eq!(
            MediaKind::detect(None, "application/octet-stream", "Brief.PDF"),
            Some(MediaKind::Document)
        );
        assert_eq!(MediaKind::detect(None, "text/plain", "notes.txt"), None);
    }
}
