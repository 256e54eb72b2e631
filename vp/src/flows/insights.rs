//! Insight generator
//!
//! Summarizes a user's plan and itinerary history into a handful of
//! encouraging observations. Read-only and best-effort: a failure here
//! never blocks or corrupts plan/itinerary state.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::{StoredItinerary, StoredPlan, UserInsights};
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;
use crate::schema;

use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 2048;

#[derive(Serialize)]
struct InsightsContext {
    plan_history_json: String,
    itinerary_history_json: String,
}

/// Generates encouraging insights from user history
pub struct InsightGenerator {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
}

impl InsightGenerator {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Generate insights from the user's full history
    ///
    /// Fails with [`PipelineError::Generation`] when the model returns no
    /// output; the facade treats any failure as fail-soft.
    pub async fn generate(
        &self,
        plan_history: &[StoredPlan],
        itinerary_history: &[StoredItinerary],
    ) -> Result<UserInsights, PipelineError> {
        debug!(
            plans = plan_history.len(),
            itineraries = itinerary_history.len(),
            "generate: called"
        );

        let context = InsightsContext {
            plan_history_json: serde_json::to_string(plan_history)
                .map_err(|source| PipelineError::Validation { stage: "insights", source })?,
            itinerary_history_json: serde_json::to_string(itinerary_history)
                .map_err(|source| PipelineError::Validation { stage: "insights", source })?,
        };

        let prompt = render_prompt(&self.prompts, "insights", &context)?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::insights_schema());

        let raw = generate_text(&self.llm, request)
            .await?
            .ok_or(PipelineError::Generation { stage: "insights" })?;

        let insights: UserInsights = schema::parse_validated("insights", &raw)?;
        debug!(count = insights.insights.len(), "generate: done");
        Ok(insights)
    }
}
