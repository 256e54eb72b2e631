//! Pipeline error taxonomy
//!
//! Validation and no-output failures are always surfaced to the facade;
//! defensive repairs (id backfill, completed-flag coercion) are silent and
//! never appear here.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors raised by pipeline components
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transcription produced no text; fatal to the calling operation
    #[error("Transcription returned no text")]
    Transcription,

    /// A generation step returned no output; fatal to that operation
    #[error("{stage} generation returned no output")]
    Generation { stage: &'static str },

    /// Task detail extraction returned no output; non-fatal inside plan
    /// enrichment, fatal standalone
    #[error("Task detail extraction returned no output")]
    Extraction,

    /// Model output did not conform to the expected schema; fatal, since
    /// downstream consumers assume schema-valid data
    #[error("Schema validation failed for {stage}: {source}")]
    Validation {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A prompt template failed to load or render; an internal fault, not
    /// a model one
    #[error("Prompt template error: {0}")]
    Template(String),

    /// Transport or API failure from the model collaborator
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl PipelineError {
    /// Stage name for logging/diagnostics
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Transcription => "transcription",
            PipelineError::Generation { stage } => stage,
            PipelineError::Extraction => "task-details",
            PipelineError::Validation { stage, .. } => stage,
            PipelineError::Template(_) => "prompt",
            PipelineError::Llm(_) => "model-call",
        }
    }
}
