//! Text recognition via the Google Cloud Vision API
//!
//! Two payload shapes against the same `images:annotate` endpoint: images
//! request general plus document text detection in a single call, raw
//! documents request document text detection only, with language hints.

use async_trait::async_trait;
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::VisionConfig;
use crate::modules::extraction::error::{ExtractError, ExtractResult};

/// Language hints for the document fallback request
const DOCUMENT_LANGUAGE_HINTS: [&str; 2] = ["de", "en"];

/// Vision boundary. Production uses [`GoogleVisionClient`]; tests
/// substitute mocks.
#[async_trait]
pub trait VisionTextDetection: Send + Sync {
    /// General + document text detection for an image
    async fn annotate_image(&self, data: &[u8], mime_type: &str) -> ExtractResult<String>;

    /// Document text detection for raw document bytes (the optical fallback)
    async fn annotate_document(&self, data: &[u8]) -> ExtractResult<String>;
}

pub struct GoogleVisionClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
}

#[derive(Debug, Serialize)]
struct VisionRequest {
    requests: Vec<AnnotateRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    image: ImageContent,
    features: Vec<Feature>,
    #[serde(rename = "imageContext", skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Serialize)]
struct ImageContext {
    #[serde(rename = "languageHints")]
    language_hints: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(rename = "fullTextAnnotation")]
    full_text_annotation: Option<FullTextAnnotation>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct VisionErrorBody {
    error: VisionError,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    message: String,
    status: Option<String>,
}

impl GoogleVisionClient {
    pub fn new(config: &VisionConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
        }
    }

    async fn annotate(&self, request: &VisionRequest) -> ExtractResult<(u16, String)> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ExtractError::MissingCredentials("Google Vision"))?;

        let url = format!("{}/images:annotate?key={}", self.api_base, api_key);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok((status, body))
    }
}

#[async_trait]
impl VisionTextDetection for GoogleVisionClient {
    async fn annotate_image(&self, data: &[u8], mime_type: &str) -> ExtractResult<String> {
        debug!(
            "Annotating image ({} bytes, {}) via Google Vision",
            data.len(),
            mime_type
        );

        let request = VisionRequest {
            requests: vec![AnnotateRequest {
                image: ImageContent {
                    content: BASE64_STANDARD.encode(data),
                },
                features: vec![
                    Feature {
                        feature_type: "TEXT_DETECTION",
                        max_results: 10,
                    },
                    Feature {
                        feature_type: "DOCUMENT_TEXT_DETECTION",
                        max_results: 10,
                    },
                ],
                image_context: None,
            }],
        };

        let (status, body) = self.annotate(&request).await?;
        if !(200..300).contains(&status) {
            return Err(parse_vision_error(status, &body, false));
        }

        extract_annotated_text(&body)?.ok_or(ExtractError::NoTextDetected("image"))
    }

    async fn annotate_document(&self, data: &[u8]) -> ExtractResult<String> {
        debug!("Annotating document ({} bytes) via Google Vision", data.len());

        let request = VisionRequest {
            requests: vec![AnnotateRequest {
                image: ImageContent {
                    content: BASE64_STANDARD.encode(data),
                },
                features: vec![Feature {
                    feature_type: "DOCUMENT_TEXT_DETECTION",
                    max_results: 1,
                }],
                image_context: Some(ImageContext {
                    language_hints: DOCUMENT_LANGUAGE_HINTS.to_vec(),
                }),
            }],
        };

        let (status, body) = self.annotate(&request).await?;
        if !(200..300).contains(&status) {
            return Err(parse_vision_error(status, &body, true));
        }

        extract_annotated_text(&body)?.ok_or(ExtractError::NoTextDetected("document"))
    }
}

/// Parse a non-2xx vision response. For document payloads an
/// invalid-image rejection maps to the unsupported-format sub-case.
fn parse_vision_error(status: u16, body: &str, document_payload: bool) -> ExtractError {
    match serde_json::from_str::<VisionErrorBody>(body) {
        Ok(parsed) => {
            if document_payload
                && (parsed.error.message.contains("Invalid image data")
                    || parsed.error.message.contains("Invalid image format"))
            {
                return ExtractError::UnsupportedDocumentFormat;
            }
            ExtractError::Api {
                service: "Google Vision",
                message: parsed.error.message,
                detail: format!(
                    "status: {}",
                    parsed.error.status.unwrap_or_else(|| "unknown".to_string())
                ),
            }
        }
        Err(_) => ExtractError::UnexpectedStatus {
            status,
            body: body.to_string(),
        },
    }
}

/// Pull the preferred annotation out of a 2xx response body.
///
/// The full-document annotation preserves structure and wins when present
/// and non-empty; otherwise the first general annotation (which aggregates
/// all detected text) is used. `Ok(None)` means the service saw no text.
fn extract_annotated_text(body: &str) -> ExtractResult<Option<String>> {
    let parsed: VisionResponse =
        serde_json::from_str(body).map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

    let first = parsed
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::InvalidResponse("empty responses array".to_string()))?;

    if let Some(full) = first.full_text_annotation {
        if !full.text.is_empty() {
            return Ok(Some(full.text));
        }
    }

    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .filter(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_annotation_is_preferred() {
        let body = r#"{
            "responses": [{
                "textAnnotations": [{"description": "word soup"}],
                "fullTextAnnotation": {"text": "Strukturierter Text\nZeile zwei"}
            }]
        }"#;
        assert_eq!(
            extract_annotated_text(body).unwrap(),
            Some("Strukturierter Text\nZeile zwei".to_string())
        );
    }

    #[test]
    fn falls_back_to_first_text_annotation() {
        let body = r#"{
            "responses": [{
                "textAnnotations": [
                    {"description": "Alle erkannten Worte"},
                    {"description": "Alle"}
                ]
            }]
        }"#;
        assert_eq!(
            extract_annotated_text(body).unwrap(),
            Some("Alle erkannten Worte".to_string())
        );
    }

    #[test]
    fn empty_annotations_yield_none() {
        let body = r#"{"responses": [{}]}"#;
        assert_eq!(extract_annotated_text(body).unwrap(), None);
    }

    #[test]
    fn empty_responses_array_is_invalid() {
        let body = r#"{"responses": []}"#;
        assert!(matches!(
            extract_annotated_text(body),
            Err(ExtractError::InvalidResponse(_))
        ));
    }

    #[test]
    fn invalid_image_format_on_document_payload_is_distinguished() {
        let body = r#"{"error":{"message":"Invalid image format.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            parse_vision_error(400, body, true),
            ExtractError::UnsupportedDocumentFormat
        ));
        // Same body on an image payload stays a plain API error
        assert!(matches!(
            parse_vision_error(400, body, false),
            ExtractError::Api { .. }
        ));
    }

    #[test]
    fn unparsable_error_body_falls_back_to_status_and_body() {
        match parse_vision_error(500, "oops", false) {
            ExtractError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_network_call() {
        let client = GoogleVisionClient::new(
            &VisionConfig {
                api_key: None,
                api_base: "http://127.0.0.1:1".to_string(),
            },
            reqwest::Client::new(),
        );

        let err = client.annotate_image(b"png", "image/png").await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingCredentials("Google Vision")
        ));
    }
}
