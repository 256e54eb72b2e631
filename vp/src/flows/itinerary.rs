//! Itinerary generator
//!
//! Creates or updates a multi-day travel itinerary from transcribed text.
//! Unlike the plan generator, update is wholly prompt-driven: the model
//! receives the prior itinerary and produces a complete replacement. Vague
//! input yields an explicit empty-result sentinel; destinations and dates
//! are never fabricated.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::Itinerary;
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;
use crate::schema;

use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 8192;

/// Result of itinerary generation
///
/// `InsufficientDetail` is a distinguishable negative outcome, not an
/// error; the caller must check for it explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum ItineraryOutcome {
    Generated(Itinerary),
    InsufficientDetail,
}

#[derive(Serialize)]
struct ItineraryContext<'a> {
    transcribed_text: &'a str,
    existing_itinerary_json: Option<String>,
}

/// Generates and updates itineraries
pub struct ItineraryGenerator {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
}

impl ItineraryGenerator {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Generate an itinerary, or update the supplied one
    ///
    /// Fails with [`PipelineError::Generation`] when the model returns no
    /// output at all; a structurally empty object is the
    /// [`ItineraryOutcome::InsufficientDetail`] sentinel instead.
    pub async fn generate(&self, text: &str, existing: Option<&Itinerary>) -> Result<ItineraryOutcome, PipelineError> {
        debug!(update = existing.is_some(), "generate: called");

        let existing_itinerary_json = match existing {
            Some(itinerary) => Some(
                serde_json::to_string_pretty(itinerary)
                    .map_err(|source| PipelineError::Validation { stage: "itinerary", source })?,
            ),
            None => None,
        };

        let prompt = render_prompt(
            &self.prompts,
            "itinerary",
            &ItineraryContext {
                transcribed_text: text,
                existing_itinerary_json,
            },
        )?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::itinerary_schema());

        let raw = generate_text(&self.llm, request)
            .await?
            .ok_or(PipelineError::Generation { stage: "itinerary" })?;

        let value = schema::parse_value("itinerary", &raw)?;
        if is_structurally_empty(&value) {
            debug!("generate: structurally empty output, returning sentinel");
            return Ok(ItineraryOutcome::InsufficientDetail);
        }

        let itinerary: Itinerary =
            serde_json::from_value(value).map_err(|source| PipelineError::Validation { stage: "itinerary", source })?;

        Ok(ItineraryOutcome::Generated(itinerary.with_backfilled_ids()))
    }
}

/// An output object with no days is the model saying "not enough
/// information", per the prompt contract
fn is_structurally_empty(value: &Value) -> bool {
    match value.as_object() {
        None => true,
        Some(obj) => {
            if obj.is_empty() {
                return true;
            }
            obj.get("days")
                .and_then(|d| d.as_array())
                .map(|days| days.is_empty())
                .unwrap_or(true)
        }
    }
}
