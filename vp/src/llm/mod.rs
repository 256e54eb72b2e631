//! Model invocation layer for VoicePlan
//!
//! Every pipeline component talks to the model through the
//! [`GenerativeClient`] trait; the concrete client is created once at
//! startup and shared by reference.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod google;
mod types;

pub use client::GenerativeClient;
pub use error::LlmError;
pub use google::GoogleClient;
pub use types::{FinishReason, GenerationRequest, GenerationResponse, MediaPart, TokenUsage};

use crate::config::LlmConfig;

/// Create a model client based on the provider specified in config
///
/// Currently only the "google" provider is supported.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn GenerativeClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "google" => Ok(Arc::new(GoogleClient::from_config(config)?)),
        other => Err(LlmError::InvalidResponse(format!(
            "Unknown LLM provider: '{}'. Supported: google",
            other
        ))),
    }
}
