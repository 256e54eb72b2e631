//! Orchestration facade
//!
//! The server-exposed entry points wiring the pipeline components into
//! end-to-end operations. Every operation returns a uniform response shape
//! carrying either a payload or an error string, never both, and never lets
//! an error escape unhandled.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Itinerary, Plan, StoredItinerary, StoredPlan, Task, UserInsights};
use crate::error::PipelineError;
use crate::flows::{
    AudioPayload, ContextHint, InsightGenerator, Intent, IntentRouter, ItineraryGenerator, ItineraryOutcome,
    PlanGenerator, PlanRequest, SubtaskAugmenter, Transcriber,
};
use crate::llm::GenerativeClient;
use crate::prompts::PromptLoader;

const TRANSCRIBE_FAILED: &str = "Failed to transcribe audio. The recording might be silent or too short.";
const UNSUPPORTED_REQUEST: &str =
    "I wasn't able to create a plan or itinerary from that. Please try describing your tasks or trip more directly.";
const ITINERARY_TOO_VAGUE: &str =
    "Could not update the itinerary from the provided text. Please ensure it contains enough detail.";
const GENERATION_FAILED: &str = "Generation failed. Please try rephrasing your request.";

/// Uniform response shape for all facade operations
///
/// Exactly one of `data` and `error` is set. `transcription` accompanies
/// both outcomes once transcription has succeeded, so the UI can echo what
/// was heard even when generation fails.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResponse<T> {
    fn success(data: T, transcription: Option<String>) -> Self {
        Self {
            data: Some(data),
            transcription,
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            data: None,
            transcription: None,
            error: Some(error.into()),
        }
    }

    fn failure_with_transcription(transcription: String, error: impl Into<String>) -> Self {
        Self {
            data: None,
            transcription: Some(transcription),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

/// Generated content, discriminated by type on the wire:
/// `{"type": "plan", "data": {...}}`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum GeneratedContent {
    Plan(Plan),
    Itinerary(Itinerary),
}

/// Map a pipeline error to the user-facing message for it
fn user_message(err: &PipelineError) -> String {
    match err {
        PipelineError::Transcription => TRANSCRIBE_FAILED.to_string(),
        PipelineError::Generation { .. }
        | PipelineError::Extraction
        | PipelineError::Validation { .. }
        | PipelineError::Template(_) => GENERATION_FAILED.to_string(),
        PipelineError::Llm(e) => format!("An unexpected error occurred on the server: {}", e),
    }
}

/// The orchestration facade
///
/// Constructed once at startup with the injected model client; all
/// components share it by reference.
pub struct VoicePlanner {
    transcriber: Transcriber,
    router: IntentRouter,
    plans: PlanGenerator,
    itineraries: ItineraryGenerator,
    subtasks: SubtaskAugmenter,
    insights: InsightGenerator,
}

impl VoicePlanner {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self {
            transcriber: Transcriber::new(llm.clone(), prompts.clone()),
            router: IntentRouter::new(llm.clone(), prompts.clone()),
            plans: PlanGenerator::new(llm.clone(), prompts.clone()),
            itineraries: ItineraryGenerator::new(llm.clone(), prompts.clone()),
            subtasks: SubtaskAugmenter::new(llm.clone(), prompts.clone()),
            insights: InsightGenerator::new(llm, prompts),
        }
    }

    /// Operation 1: generate new content from voice
    ///
    /// transcribe -> route intent -> generate plan or itinerary
    pub async fn generate_content_from_voice(
        &self,
        audio: &AudioPayload,
        context: Option<ContextHint>,
    ) -> ActionResponse<GeneratedContent> {
        let transcription = match self.transcriber.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "generate_content_from_voice: transcription failed");
                return ActionResponse::failure(user_message(&e));
            }
        };

        let intent = match self.router.classify(&transcription, context).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, "generate_content_from_voice: intent classification failed");
                return ActionResponse::failure_with_transcription(transcription, user_message(&e));
            }
        };

        match intent {
            Intent::Plan => match self.plans.generate(&PlanRequest::create(&transcription)).await {
                Ok(plan) => {
                    info!(tasks = plan.task_count(), "generate_content_from_voice: plan generated");
                    ActionResponse::success(GeneratedContent::Plan(plan), Some(transcription))
                }
                Err(e) => {
                    warn!(error = %e, "generate_content_from_voice: plan generation failed");
                    ActionResponse::failure_with_transcription(transcription, user_message(&e))
                }
            },
            Intent::Itinerary => match self.itineraries.generate(&transcription, None).await {
                Ok(ItineraryOutcome::Generated(itinerary)) => {
                    info!(
                        activities = itinerary.activity_count(),
                        "generate_content_from_voice: itinerary generated"
                    );
                    ActionResponse::success(GeneratedContent::Itinerary(itinerary), Some(transcription))
                }
                Ok(ItineraryOutcome::InsufficientDetail) => {
                    info!("generate_content_from_voice: itinerary input too vague");
                    ActionResponse::failure_with_transcription(transcription, UNSUPPORTED_REQUEST)
                }
                Err(e) => {
                    warn!(error = %e, "generate_content_from_voice: itinerary generation failed");
                    ActionResponse::failure_with_transcription(transcription, user_message(&e))
                }
            },
            Intent::Unsupported => {
                info!("generate_content_from_voice: unsupported intent");
                ActionResponse::failure_with_transcription(transcription, UNSUPPORTED_REQUEST)
            }
        }
    }

    /// Operation 2: update an existing plan from voice
    pub async fn update_plan_from_voice(
        &self,
        audio: &AudioPayload,
        existing_plan: Plan,
        template: Option<String>,
    ) -> ActionResponse<Plan> {
        let transcription = match self.transcriber.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "update_plan_from_voice: transcription failed");
                return ActionResponse::failure(user_message(&e));
            }
        };

        let request = PlanRequest {
            transcribed_text: transcription.clone(),
            existing_plan: Some(existing_plan),
            template,
        };

        match self.plans.generate(&request).await {
            Ok(plan) => ActionResponse::success(plan, Some(transcription)),
            Err(e) => {
                warn!(error = %e, "update_plan_from_voice: generation failed");
                ActionResponse::failure_with_transcription(transcription, user_message(&e))
            }
        }
    }

    /// Operation 3: update an existing itinerary from voice
    ///
    /// The empty-result sentinel surfaces as an error string here; there is
    /// no partial merge to fall back to.
    pub async fn update_itinerary_from_voice(
        &self,
        audio: &AudioPayload,
        existing_itinerary: &Itinerary,
    ) -> ActionResponse<Itinerary> {
        let transcription = match self.transcriber.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "update_itinerary_from_voice: transcription failed");
                return ActionResponse::failure(user_message(&e));
            }
        };

        match self.itineraries.generate(&transcription, Some(existing_itinerary)).await {
            Ok(ItineraryOutcome::Generated(itinerary)) => ActionResponse::success(itinerary, Some(transcription)),
            Ok(ItineraryOutcome::InsufficientDetail) => {
                info!("update_itinerary_from_voice: input too vague");
                ActionResponse::failure_with_transcription(transcription, ITINERARY_TOO_VAGUE)
            }
            Err(e) => {
                warn!(error = %e, "update_itinerary_from_voice: generation failed");
                ActionResponse::failure_with_transcription(transcription, user_message(&e))
            }
        }
    }

    /// Operation 4: add subtasks to a task from voice
    pub async fn add_subtasks_from_voice(&self, audio: &AudioPayload, task: &Task) -> ActionResponse<Task> {
        let transcription = match self.transcriber.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "add_subtasks_from_voice: transcription failed");
                return ActionResponse::failure(user_message(&e));
            }
        };

        match self.subtasks.augment(task, &transcription).await {
            Ok(updated) => ActionResponse::success(updated, Some(transcription)),
            Err(e) => {
                warn!(error = %e, "add_subtasks_from_voice: augmentation failed");
                ActionResponse::failure_with_transcription(transcription, user_message(&e))
            }
        }
    }

    /// Operation 5: generate insights from history
    ///
    /// Best-effort; failure yields an error string and touches nothing.
    pub async fn fetch_user_insights(
        &self,
        plan_history: &[StoredPlan],
        itinerary_history: &[StoredItinerary],
    ) -> ActionResponse<UserInsights> {
        match self.insights.generate(plan_history, itinerary_history).await {
            Ok(insights) => ActionResponse::success(insights, None),
            Err(e) => {
                warn!(error = %e, "fetch_user_insights: failed");
                ActionResponse::failure("Could not generate insights from your data.")
            }
        }
    }
}
