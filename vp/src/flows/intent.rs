//! Intent router
//!
//! Classifies transcribed text into plan/itinerary/unsupported. The context
//! hint biases the classifier but never forces an intent; unrecognized or
//! missing labels normalize to unsupported rather than erroring.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;
use crate::schema;

use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 256;

/// What the user is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Plan,
    Itinerary,
    Unsupported,
}

/// The screen the user was viewing when they spoke; advisory only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextHint {
    Plan,
    Itinerary,
}

impl std::fmt::Display for ContextHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plan => write!(f, "plan"),
            Self::Itinerary => write!(f, "itinerary"),
        }
    }
}

/// Normalize a raw classification label to the three-way intent
///
/// Pure and total: anything other than the two known labels, including a
/// missing label, maps to [`Intent::Unsupported`].
pub fn normalize_intent(raw: Option<&str>) -> Intent {
    match raw {
        Some("createPlan") => Intent::Plan,
        Some("createItinerary") => Intent::Itinerary,
        _ => Intent::Unsupported,
    }
}

#[derive(Serialize)]
struct IntentContext<'a> {
    transcribed_text: &'a str,
    context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntentOutput {
    intent: Option<String>,
}

/// Classifies transcribed text by user intent
pub struct IntentRouter {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
}

impl IntentRouter {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Classify the text, optionally biased by a context hint
    ///
    /// Transport failures propagate; ambiguous or unparseable model output
    /// is fail-safe and classifies as unsupported.
    pub async fn classify(&self, text: &str, context: Option<ContextHint>) -> Result<Intent, PipelineError> {
        let prompt = render_prompt(
            &self.prompts,
            "route-intent",
            &IntentContext {
                transcribed_text: text,
                context: context.map(|c| c.to_string()),
            },
        )?;

        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::intent_schema());

        let raw = match generate_text(&self.llm, request).await? {
            Some(raw) => raw,
            None => {
                debug!("classify: no output, defaulting to unsupported");
                return Ok(Intent::Unsupported);
            }
        };

        let label = match schema::parse_validated::<IntentOutput>("intent", &raw) {
            Ok(output) => output.intent,
            Err(e) => {
                debug!(error = %e, "classify: unparseable output, defaulting to unsupported");
                None
            }
        };

        let intent = normalize_intent(label.as_deref());
        debug!(?intent, "classify: resolved");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationResponse;
    use crate::llm::client::mock::MockClient;

    fn router_with(responses: Vec<GenerationResponse>) -> IntentRouter {
        IntentRouter::new(Arc::new(MockClient::new(responses)), Arc::new(PromptLoader::embedded_only()))
    }

    #[test]
    fn test_normalize_intent_is_total() {
        assert_eq!(normalize_intent(Some("createPlan")), Intent::Plan);
        assert_eq!(normalize_intent(Some("createItinerary")), Intent::Itinerary);
        assert_eq!(normalize_intent(Some("unsupported")), Intent::Unsupported);
        assert_eq!(normalize_intent(Some("somethingElse")), Intent::Unsupported);
        assert_eq!(normalize_intent(Some("")), Intent::Unsupported);
        assert_eq!(normalize_intent(None), Intent::Unsupported);
    }

    #[tokio::test]
    async fn test_classify_plan() {
        let router = router_with(vec![GenerationResponse::text(r#"{"intent": "createPlan"}"#)]);
        let intent = router.classify("Buy milk, eggs, and bread", None).await.unwrap();
        assert_eq!(intent, Intent::Plan);
    }

    #[tokio::test]
    async fn test_classify_itinerary() {
        let router = router_with(vec![GenerationResponse::text(r#"{"intent": "createItinerary"}"#)]);
        let intent = router
            .classify("Plan a 3-day trip to Lisbon from June 1 to June 3", None)
            .await
            .unwrap();
        assert_eq!(intent, Intent::Itinerary);
    }

    #[tokio::test]
    async fn test_classify_unsupported() {
        let router = router_with(vec![GenerationResponse::text(r#"{"intent": "unsupported"}"#)]);
        let intent = router.classify("What's the weather today?", None).await.unwrap();
        assert_eq!(intent, Intent::Unsupported);
    }

    #[tokio::test]
    async fn test_no_output_defaults_to_unsupported() {
        let router = router_with(vec![GenerationResponse::empty()]);
        let intent = router.classify("mumbling", None).await.unwrap();
        assert_eq!(intent, Intent::Unsupported);
    }

    #[tokio::test]
    async fn test_garbage_output_defaults_to_unsupported() {
        let router = router_with(vec![GenerationResponse::text("garbage not json")]);
        let intent = router.classify("mumbling", None).await.unwrap();
        assert_eq!(intent, Intent::Unsupported);
    }

    #[tokio::test]
    async fn test_context_hint_lands_in_prompt() {
        let client = Arc::new(MockClient::new(vec![GenerationResponse::text(
            r#"{"intent": "createItinerary"}"#,
        )]));
        let router = IntentRouter::new(client.clone(), Arc::new(PromptLoader::embedded_only()));

        router
            .classify("add a museum visit", Some(ContextHint::Itinerary))
            .await
            .unwrap();

        let prompts = client.prompts();
        assert!(prompts[0].contains("currently viewing a itinerary"));
    }
}
