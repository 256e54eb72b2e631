//! Task detail extractor
//!
//! Derives category, priority, deadline, and emoji for a single task
//! description. Invoked per task by the plan generator, which treats a
//! failure here as a non-fatal, per-task event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Priority;
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;
use crate::schema;

use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 1024;

/// Structured details for a single task
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDetails {
    /// The detailed description of the task
    pub task: String,

    /// Free-text category label (e.g. "Work", "Personal")
    pub category: String,

    #[serde(default)]
    pub deadline: Option<String>,

    pub priority: Priority,

    /// Single representative emoji
    pub emoji: String,
}

#[derive(Serialize)]
struct DetailsContext<'a> {
    transcribed_text: &'a str,
}

/// Extracts structured details from a single task description
pub struct TaskDetailExtractor {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
}

impl TaskDetailExtractor {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Extract details for one task description
    ///
    /// Fails with [`PipelineError::Extraction`] when the model returns no
    /// output.
    pub async fn extract(&self, description: &str) -> Result<TaskDetails, PipelineError> {
        debug!(chars = description.len(), "extract: called");

        let prompt = render_prompt(
            &self.prompts,
            "task-details",
            &DetailsContext {
                transcribed_text: description,
            },
        )?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::task_details_schema());

        let raw = generate_text(&self.llm, request).await?.ok_or(PipelineError::Extraction)?;

        let mut details: TaskDetails = schema::parse_validated("task-details", &raw)?;
        details.emoji = resolve_emoji_shorthand(&details.emoji);

        debug!(category = %details.category, priority = %details.priority, "extract: done");
        Ok(details)
    }
}

/// Resolve a `:code:` emoji shorthand to its literal character
///
/// The prompt already asks for literal emoji; this catches the common
/// shorthands that slip through. Unknown codes pass through unchanged.
pub(crate) fn resolve_emoji_shorthand(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() < 3 || !trimmed.starts_with(':') || !trimmed.ends_with(':') {
        return trimmed.to_string();
    }

    let resolved = match &trimmed[1..trimmed.len() - 1] {
        "tada" => "🎉",
        "briefcase" => "💼",
        "rocket" => "🚀",
        "house" => "🏠",
        "books" => "📚",
        "muscle" => "💪",
        "airplane" => "✈️",
        "pizza" => "🍕",
        "phone" | "telephone" => "📞",
        "calendar" => "📅",
        "shopping_cart" => "🛒",
        "memo" => "📝",
        _ => return trimmed.to_string(),
    };
    resolved.to_string()
}
