//! Google Gemini API client implementation
//!
//! Implements the GenerativeClient trait for the generateContent endpoint,
//! with structured JSON output via response schemas and inline media parts
//! for audio transcription.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{FinishReason, GenerationRequest, GenerationResponse, GenerativeClient, LlmError, TokenUsage};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Google Gemini API client
pub struct GoogleClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GoogleClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the generateContent API
    fn build_request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": request.prompt })];

        if let Some(media) = &request.media {
            parts.push(serde_json::json!({
                "inline_data": {
                    "mime_type": media.mime_type,
                    "data": media.data,
                }
            }));
        }

        let mut generation_config = serde_json::json!({
            "maxOutputTokens": request.max_tokens.min(self.max_tokens),
        });

        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = serde_json::json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
            "generationConfig": generation_config,
        })
    }

    /// Parse the API response into a GenerationResponse
    fn parse_response(&self, api_response: GoogleResponse) -> GenerationResponse {
        let mut text: Option<String> = None;
        let mut finish_reason = FinishReason::Stop;

        if let Some(candidate) = api_response.candidates.into_iter().next() {
            if let Some(reason) = &candidate.finish_reason {
                finish_reason = FinishReason::from_google(reason);
            }
            if let Some(content) = candidate.content {
                let joined: String = content.parts.into_iter().filter_map(|p| p.text).collect();
                if !joined.is_empty() {
                    text = Some(joined);
                }
            }
        }

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count.unwrap_or(0),
                output_tokens: u.candidates_token_count.unwrap_or(0),
            })
            .unwrap_or_default();

        GenerationResponse {
            text,
            finish_reason,
            usage,
        }
    }
}

#[async_trait]
impl GenerativeClient for GoogleClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, has_media = request.media.is_some(), "generate: called");
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = self.build_request_body(&request);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("x-goog-api-key", self.api_key.clone())
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                return Err(LlmError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "generate: retryable error");
                last_error = Some(LlmError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiError { status, message: text });
            }

            let api_response: GoogleResponse = response.json().await.map_err(LlmError::Network)?;
            return Ok(self.parse_response(api_response));
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Retries exhausted with no error recorded".to_string())))
    }
}

/// Response DTOs for the generateContent API

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GoogleUsage>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Deserialize)]
struct GooglePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u64>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MediaPart;

    fn test_client() -> GoogleClient {
        GoogleClient {
            model: "gemini-1.5-pro".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            max_tokens: 8192,
        }
    }

    #[test]
    fn test_build_request_body_text_only() {
        let client = test_client();
        let req = GenerationRequest::new("Hello", 1024);
        let body = client.build_request_body(&req);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_build_request_body_with_media_and_schema() {
        let client = test_client();
        let req = GenerationRequest::new("Transcribe", 1024)
            .with_media(MediaPart::new("audio/wav", "QUJD"))
            .with_schema(serde_json::json!({"type": "object"}));
        let body = client.build_request_body(&req);

        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "audio/wav");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "object");
    }

    #[test]
    fn test_build_request_body_caps_max_tokens() {
        let client = test_client();
        let req = GenerationRequest::new("Hello", 1_000_000);
        let body = client.build_request_body(&req);

        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let client = test_client();
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{"text": "{\"a\":"}, {"text": "1}"}] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
        });
        let api_response: GoogleResponse = serde_json::from_value(raw).unwrap();
        let resp = client.parse_response(api_response);

        assert_eq!(resp.text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(resp.finish_reason, FinishReason::Stop);
        assert_eq!(resp.usage.prompt_tokens, 10);
        assert_eq!(resp.usage.output_tokens, 5);
    }

    #[test]
    fn test_parse_response_no_candidates_is_empty() {
        let client = test_client();
        let api_response: GoogleResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        let resp = client.parse_response(api_response);
        assert!(resp.text.is_none());
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(404));
    }
}
