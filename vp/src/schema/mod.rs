//! Structured output contracts for every generation step
//!
//! Each pipeline step sends a response schema with its request and runs the
//! returned text through [`parse_validated`], a pure function from raw model
//! output to a typed value. Schema mismatches are fatal; downstream
//! consumers assume schema-valid data.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::PipelineError;

/// Parse raw model text into a typed value, validating against the serde
/// contract. Strips markdown code fences first; some models wrap JSON in
/// them even when asked not to.
pub fn parse_validated<T: DeserializeOwned>(stage: &'static str, raw: &str) -> Result<T, PipelineError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|source| PipelineError::Validation { stage, source })
}

/// Parse raw model text into an untyped JSON value
///
/// Used where the shape must be inspected before typed validation (the
/// itinerary empty-result sentinel).
pub fn parse_value(stage: &'static str, raw: &str) -> Result<Value, PipelineError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|source| PipelineError::Validation { stage, source })
}

/// Strip a surrounding markdown code fence, if present
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Schema for the transcription step
pub fn transcription_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "transcription": {
                "type": "string",
                "description": "The transcribed text from the audio input."
            }
        },
        "required": ["transcription"]
    })
}

/// Schema for intent classification
pub fn intent_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "intent": {
                "type": "string",
                "enum": ["createPlan", "createItinerary", "unsupported"],
                "description": "The recognized intent of the user based on their transcribed text."
            }
        },
        "required": ["intent"]
    })
}

fn subtask_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": "A unique identifier for the subtask." },
            "text": { "type": "string", "description": "The description of the subtask." },
            "completed": { "type": "boolean", "description": "Must be false for new subtasks." }
        },
        "required": ["text"]
    })
}

/// Full task schema, used for plan updates and subtask augmentation
pub fn task_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": "A unique identifier for the task." },
            "task": { "type": "string", "description": "The description of the task." },
            "emoji": { "type": "string", "description": "A single emoji that visually represents the task." },
            "deadline": { "type": "string", "description": "The deadline for the task, if any." },
            "priority": { "type": "string", "enum": ["High", "Medium", "Low"] },
            "people": { "type": "array", "items": { "type": "string" } },
            "organizations": { "type": "array", "items": { "type": "string" } },
            "status": { "type": "string", "enum": ["To Do", "In Progress", "Done"] },
            "reminder": {
                "type": "object",
                "properties": {
                    "time": { "type": "string" },
                    "question": { "type": "string" }
                },
                "required": ["time", "question"]
            },
            "subtasks": { "type": "array", "items": subtask_schema() }
        },
        "required": ["task"]
    })
}

/// Bare task schema for plan creation: descriptions and subtasks only.
/// Emoji, priority, and deadline are deferred to per-task enrichment.
fn bare_task_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": "A unique identifier for the task." },
            "task": { "type": "string", "description": "The description of the task." },
            "subtasks": { "type": "array", "items": subtask_schema() }
        },
        "required": ["task"]
    })
}

fn categories_schema(task_items: Value) -> Value {
    json!({
        "type": "array",
        "description": "A list of categorized tasks.",
        "items": {
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "The name of the category for this group of tasks."
                },
                "tasks": { "type": "array", "items": task_items }
            },
            "required": ["category", "tasks"]
        }
    })
}

/// Schema for plan creation (bare structure)
pub fn plan_structure_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "description": "A concise and relevant title for the generated plan." },
            "summary": { "type": "string", "description": "A brief one-sentence summary of the plan." },
            "categories": categories_schema(bare_task_schema())
        },
        "required": ["title", "summary", "categories"]
    })
}

/// Schema for plan updates (full task fields)
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "description": "A concise and relevant title for the generated plan." },
            "summary": { "type": "string", "description": "A brief one-sentence summary of the plan." },
            "categories": categories_schema(task_schema())
        },
        "required": ["title", "summary", "categories"]
    })
}

/// Schema for single-task detail extraction
pub fn task_details_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "task": { "type": "string", "description": "The detailed description of the task." },
            "category": { "type": "string", "description": "The category of the task (e.g. \"Work\", \"Personal\")." },
            "deadline": { "type": "string", "description": "The deadline or time for the task, if mentioned." },
            "priority": { "type": "string", "enum": ["High", "Medium", "Low"] },
            "emoji": { "type": "string", "description": "A single, relevant Unicode emoji for the task." }
        },
        "required": ["task", "category", "priority", "emoji"]
    })
}

/// Schema for itinerary generation
pub fn itinerary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "description": "A concise and relevant title for the generated itinerary." },
            "startDate": { "type": "string", "description": "The start date of the itinerary (e.g. '2024-12-20')." },
            "endDate": { "type": "string", "description": "The end date of the itinerary (e.g. '2024-12-27')." },
            "days": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "day": { "type": "integer", "description": "The day number of the itinerary, starting from 1." },
                        "title": { "type": "string", "description": "A title for the day's theme." },
                        "activities": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string" },
                                    "time": { "type": "string", "description": "The time of the activity (e.g. '9:00 AM')." },
                                    "description": { "type": "string" },
                                    "emoji": { "type": "string" },
                                    "type": { "type": "string", "enum": ["travel", "food", "activity", "lodging"] }
                                },
                                "required": ["time", "description", "type"]
                            }
                        }
                    },
                    "required": ["day", "title", "activities"]
                }
            }
        }
    })
}

/// Schema for user insights
pub fn insights_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "insights": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "emoji": { "type": "string", "description": "A single emoji that visually represents the insight." },
                        "text": { "type": "string", "description": "The concise, encouraging insight text." }
                    },
                    "required": ["emoji", "text"]
                }
            },
            "productivityPeak": {
                "type": "string",
                "description": "The user's most productive day of the week, if a clear pattern exists."
            }
        },
        "required": ["insights"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        transcription: String,
    }

    #[test]
    fn test_parse_validated_plain_json() {
        let parsed: Wrapper = parse_validated("transcription", r#"{"transcription": "buy milk"}"#).unwrap();
        assert_eq!(parsed.transcription, "buy milk");
    }

    #[test]
    fn test_parse_validated_strips_fences() {
        let raw = "```json\n{\"transcription\": \"buy milk\"}\n```";
        let parsed: Wrapper = parse_validated("transcription", raw).unwrap();
        assert_eq!(parsed.transcription, "buy milk");
    }

    #[test]
    fn test_parse_validated_rejects_garbage() {
        let result: Result<Wrapper, _> = parse_validated("transcription", "not json at all");
        assert!(matches!(
            result,
            Err(PipelineError::Validation { stage: "transcription", .. })
        ));
    }

    #[test]
    fn test_strip_code_fences_untouched_without_fence() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fences_without_info_string() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_schemas_are_objects() {
        for schema in [
            transcription_schema(),
            intent_schema(),
            plan_structure_schema(),
            plan_schema(),
            task_schema(),
            task_details_schema(),
            itinerary_schema(),
            insights_schema(),
        ] {
            assert_eq!(schema["type"], "object");
        }
    }

    #[test]
    fn test_plan_structure_schema_defers_detail_fields() {
        let schema = plan_structure_schema();
        let task_props =
            &schema["properties"]["categories"]["items"]["properties"]["tasks"]["items"]["properties"];
        assert!(task_props.get("emoji").is_none());
        assert!(task_props.get("priority").is_none());
        assert!(task_props.get("deadline").is_none());
        // The full plan schema does carry them
        let full = plan_schema();
        let full_props =
            &full["properties"]["categories"]["items"]["properties"]["tasks"]["items"]["properties"];
        assert!(full_props.get("emoji").is_some());
        assert!(full_props.get("priority").is_some());
    }
}
