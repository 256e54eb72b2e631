//! GenerativeClient trait definition

use async_trait::async_trait;

use super::{GenerationRequest, GenerationResponse, LlmError};

/// Stateless generative model client - each call is independent
///
/// This is the core abstraction for every model interaction in the
/// pipeline: transcription, intent classification, and structured
/// generation are all single-turn calls with no conversation state
/// carried between them. Components receive the client by reference at
/// construction time; there is no process-wide model handle.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send a single generation request and wait for the full response
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}
