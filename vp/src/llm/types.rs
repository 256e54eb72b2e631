//! LLM request/response types for VoicePlan
//!
//! These types model the Gemini generateContent API but stay
//! provider-agnostic enough to support other structured-output providers.

use serde::{Deserialize, Serialize};

/// A generation request - everything needed for one model call
///
/// Every pipeline step is a single-turn call: one rendered prompt,
/// optionally one inline media part (audio), optionally a JSON schema the
/// response must conform to.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prompt text (rendered from a Handlebars template)
    pub prompt: String,

    /// Optional inline media attached to the prompt (audio payloads)
    pub media: Option<MediaPart>,

    /// JSON schema the model output must conform to; when set, the
    /// response is requested as `application/json`
    pub response_schema: Option<serde_json::Value>,

    /// Max tokens for the response (from config)
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Create a text-only request
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            media: None,
            response_schema: None,
            max_tokens,
        }
    }

    /// Attach an inline media part
    pub fn with_media(mut self, media: MediaPart) -> Self {
        self.media = Some(media);
        self
    }

    /// Request structured output conforming to the given JSON schema
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A self-describing inline media blob (MIME type + base64 payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPart {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl MediaPart {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Response from a generation request
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Text content, None when the model produced no output
    pub text: Option<String>,

    /// Why the model stopped
    pub finish_reason: FinishReason,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

impl GenerationResponse {
    /// Convenience constructor for a plain text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }

    /// A response with no output at all
    pub fn empty() -> Self {
        Self {
            text: None,
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

impl FinishReason {
    /// Parse from a Gemini API finishReason string
    pub fn from_google(s: &str) -> Self {
        match s {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::Safety,
            _ => FinishReason::Other,
        }
    }
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = GenerationRequest::new("hello", 1024)
            .with_media(MediaPart::new("audio/wav", "AAAA"))
            .with_schema(serde_json::json!({"type": "object"}));

        assert_eq!(req.prompt, "hello");
        assert_eq!(req.max_tokens, 1024);
        assert_eq!(req.media.as_ref().unwrap().mime_type, "audio/wav");
        assert!(req.response_schema.is_some());
    }

    #[test]
    fn test_finish_reason_from_google() {
        assert_eq!(FinishReason::from_google("STOP"), FinishReason::Stop);
        assert_eq!(FinishReason::from_google("MAX_TOKENS"), FinishReason::MaxTokens);
        assert_eq!(FinishReason::from_google("SAFETY"), FinishReason::Safety);
        assert_eq!(FinishReason::from_google("FINISH_REASON_UNSPECIFIED"), FinishReason::Other);
    }

    #[test]
    fn test_response_helpers() {
        let resp = GenerationResponse::text("out");
        assert_eq!(resp.text.as_deref(), Some("out"));

        let resp = GenerationResponse::empty();
        assert!(resp.text.is_none());
    }
}
