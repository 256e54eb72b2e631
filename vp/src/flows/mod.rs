//! Pipeline components
//!
//! One module per generation step. Each component owns nothing but a shared
//! reference to the model client and the prompt loader; all state flows
//! through arguments and return values.

use std::sync::Arc;

use serde::Serialize;

use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;

pub mod insights;
pub mod intent;
pub mod itinerary;
pub mod plan;
pub mod subtasks;
pub mod task_details;
pub mod transcribe;

pub use insights::InsightGenerator;
pub use intent::{ContextHint, Intent, IntentRouter, normalize_intent};
pub use itinerary::{ItineraryGenerator, ItineraryOutcome};
pub use plan::{PlanGenerator, PlanRequest};
pub use subtasks::SubtaskAugmenter;
pub use task_details::{TaskDetailExtractor, TaskDetails};
pub use transcribe::{AudioPayload, Transcriber};

/// Render a prompt template, mapping loader failures into the pipeline
/// error taxonomy
pub(crate) fn render_prompt<T: Serialize>(
    prompts: &PromptLoader,
    name: &str,
    context: &T,
) -> Result<String, PipelineError> {
    prompts
        .render(name, context)
        .map_err(|e| PipelineError::Template(e.to_string()))
}

/// Issue a generation request and return its text output, or None when the
/// model produced nothing usable
pub(crate) async fn generate_text(
    llm: &Arc<dyn GenerativeClient>,
    request: GenerationRequest,
) -> Result<Option<String>, PipelineError> {
    let response = llm.generate(request).await?;
    Ok(response.text.filter(|t| !t.trim().is_empty()))
}
