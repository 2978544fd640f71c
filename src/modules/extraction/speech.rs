//! Audio transcription via the OpenAI Whisper API
//!
//! Submits the raw audio bytes as a multipart payload and returns the
//! transcript verbatim. No post-processing, no retries.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::core::config::SpeechConfig;
use crate::modules::extraction::error::{ExtractError, ExtractResult};

const WHISPER_MODEL: &str = "whisper-1";

/// Speech-recognition boundary. Production uses [`WhisperTranscriber`];
/// tests substitute mocks.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, data: &[u8], file_name: &str) -> ExtractResult<String>;
}

pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiError,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl WhisperTranscriber {
    pub fn new(config: &SpeechConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, data: &[u8], file_name: &str) -> ExtractResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ExtractError::MissingCredentials("OpenAI"))?;

        let file_part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", WHISPER_MODEL)
            .text("language", self.language.clone());

        let url = format!("{}/audio/transcriptions", self.api_base);
        debug!("Transcribing {} bytes via {}", data.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_openai_error(status.as_u16(), &body));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text)
    }
}

fn parse_openai_error(status: u16, body: &str) -> ExtractError {
    match serde_json::from_str::<OpenAiErrorBody>(body) {
        Ok(parsed) => ExtractError::Api {
            service: "OpenAI",
            message: parsed.error.message,
            detail: format!(
                "type: {}",
                parsed.error.error_type.unwrap_or_else(|| "unknown".to_string())
            ),
        },
        Err(_) => ExtractError::UnexpectedStatus {
            status,
            body: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body_is_parsed() {
        let body = r#"{"error":{"message":"Invalid file format.","type":"invalid_request_error"}}"#;
        let err = parse_openai_error(400, body);
        match err {
            ExtractError::Api {
                service, message, ..
            } => {
                assert_eq!(service, "OpenAI");
                assert_eq!(message, "Invalid file format.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unparsable_error_body_falls_back_to_status_and_body() {
        let err = parse_openai_error(502, "<html>Bad Gateway</html>");
        match err {
            ExtractError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("Bad Gateway"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_network_call() {
        let transcriber = WhisperTranscriber::new(
            &SpeechConfig {
                api_key: None,
                api_base: "http://127.0.0.1:1".to_string(),
                language: "de".to_string(),
            },
            reqwest::Client::new(),
        );

        let err = transcriber.transcribe(b"audio", "memo.mp3").await.unwrap_err();
        assert!(matches!(err, ExtractError::MissingCredentials("OpenAI")));
    }
}
