//! VoicePlan - voice-driven planning pipeline
//!
//! VoicePlan turns spoken audio into structured plans and travel
//! itineraries. Audio is transcribed, an intent router classifies the
//! request, and a generation pipeline produces schema-validated documents
//! with defensive repair of model output. Persistence lives behind the
//! `planstore` collaborator; model access lives behind the
//! [`llm::GenerativeClient`] trait, injected once at startup.
//!
//! # Core Concepts
//!
//! - **Single-turn calls**: every model interaction is one stateless
//!   request; no conversation state is carried between steps
//! - **Typed contracts**: each generation step declares a response schema
//!   and validates output into domain types at the boundary
//! - **Silent self-healing**: missing ids and bad completed flags are
//!   repaired in pure post-processing passes, never reported as faults
//! - **Uniform facade**: every operation returns `{data?, error?}`, never
//!   an unhandled error
//!
//! # Modules
//!
//! - [`llm`] - model client trait and Gemini implementation
//! - [`flows`] - pipeline components (transcribe, route, generate)
//! - [`actions`] - the orchestration facade
//! - [`domain`] - plan/itinerary/task value types
//! - [`schema`] - structured output contracts
//! - [`prompts`] - Handlebars templates with embedded fallbacks
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod actions;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod flows;
pub mod llm;
pub mod prompts;
pub mod schema;

// Re-export commonly used types
pub use actions::{ActionResponse, GeneratedContent, VoicePlanner};
pub use config::{Config, LlmConfig, StorageConfig};
pub use domain::{
    ActivityType, Category, Insight, Itinerary, ItineraryActivity, ItineraryDay, Plan, Priority, Reminder,
    StoredItinerary, StoredPlan, Subtask, Task, TaskStatus, UserInsights,
};
pub use error::PipelineError;
pub use flows::{
    AudioPayload, ContextHint, InsightGenerator, Intent, IntentRouter, ItineraryGenerator, ItineraryOutcome,
    PlanGenerator, PlanRequest, SubtaskAugmenter, TaskDetailExtractor, TaskDetails, Transcriber,
};
pub use llm::{GenerationRequest, GenerationResponse, GenerativeClient, GoogleClient, LlmError, MediaPart};
pub use prompts::PromptLoader;
