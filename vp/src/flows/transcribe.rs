//! Transcription adapter
//!
//! Converts an audio payload to plain text via a single model call. An
//! empty transcription is a terminal failure of the whole recording
//! attempt; the caller must not retry it automatically.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient, MediaPart};
use crate::prompts::PromptLoader;
use crate::schema;

use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 2048;

/// A self-describing audio blob: MIME type plus base64 payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioPayload {
    pub mime_type: String,
    /// Base64-encoded audio bytes
    pub data: String,
}

impl AudioPayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionOutput {
    #[serde(default)]
    transcription: String,
}

/// Transcribes audio payloads to text
pub struct Transcriber {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
}

impl Transcriber {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Transcribe an audio payload
    ///
    /// Fails with [`PipelineError::Transcription`] when the model returns
    /// no output or an empty transcription.
    pub async fn transcribe(&self, audio: &AudioPayload) -> Result<String, PipelineError> {
        debug!(mime_type = %audio.mime_type, bytes = audio.data.len(), "transcribe: called");

        let prompt = render_prompt(&self.prompts, "transcribe", &serde_json::json!({}))?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS)
            .with_media(MediaPart::new(audio.mime_type.clone(), audio.data.clone()))
            .with_schema(schema::transcription_schema());

        let raw = generate_text(&self.llm, request)
            .await?
            .ok_or(PipelineError::Transcription)?;

        let output: TranscriptionOutput = schema::parse_validated("transcription", &raw)?;
        let transcription = output.transcription.trim().to_string();

        if transcription.is_empty() {
            return Err(PipelineError::Transcription);
        }

        debug!(chars = transcription.len(), "transcribe: got transcription");
        Ok(transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationResponse;
    use crate::llm::client::mock::MockClient;

    fn transcriber_with(responses: Vec<GenerationResponse>) -> Transcriber {
        Transcriber::new(Arc::new(MockClient::new(responses)), Arc::new(PromptLoader::embedded_only()))
    }

    fn wav_payload() -> AudioPayload {
        AudioPayload::new("audio/wav", "UklGRg==")
    }

    #[tokio::test]
    async fn test_transcribe_returns_text() {
        let transcriber = transcriber_with(vec![GenerationResponse::text(
            r#"{"transcription": "buy milk and eggs"}"#,
        )]);

        let text = transcriber.transcribe(&wav_payload()).await.unwrap();
        assert_eq!(text, "buy milk and eggs");
    }

    #[tokio::test]
    async fn test_empty_transcription_is_fatal() {
        let transcriber = transcriber_with(vec![GenerationResponse::text(r#"{"transcription": "  "}"#)]);

        let result = transcriber.transcribe(&wav_payload()).await;
        assert!(matches!(result, Err(PipelineError::Transcription)));
    }

    #[tokio::test]
    async fn test_no_output_is_fatal() {
        let transcriber = transcriber_with(vec![GenerationResponse::empty()]);

        let result = transcriber.transcribe(&wav_payload()).await;
        assert!(matches!(result, Err(PipelineError::Transcription)));
    }

    #[tokio::test]
    async fn test_malformed_output_is_validation_error() {
        let transcriber = transcriber_with(vec![GenerationResponse::text("not json")]);

        let result = transcriber.transcribe(&wav_payload()).await;
        assert!(matches!(result, Err(PipelineError::Validation { .. })));
    }
}
