//! Subtask augmenter
//!
//! Appends model-identified subtasks to an existing task. The task's
//! current subtasks pass through verbatim; only genuinely new entries are
//! appended, each with a fresh collision-avoided id and completed=false.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::{Subtask, Task, fresh_id_avoiding};
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;
use crate::schema;

use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct SubtasksContext<'a> {
    transcribed_text: &'a str,
    existing_task_json: String,
}

/// Adds subtasks to an existing task from free text
pub struct SubtaskAugmenter {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
}

impl SubtaskAugmenter {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Append the subtasks described in `text` to `task`
    ///
    /// Existing subtasks are never removed, reordered, or modified. Fails
    /// with [`PipelineError::Generation`] when the model returns no output.
    pub async fn augment(&self, task: &Task, text: &str) -> Result<Task, PipelineError> {
        debug!(task_id = %task.id, existing = task.subtasks.len(), "augment: called");

        let existing_task_json = serde_json::to_string_pretty(task)
            .map_err(|source| PipelineError::Validation { stage: "subtasks", source })?;

        let prompt = render_prompt(
            &self.prompts,
            "subtasks",
            &SubtasksContext {
                transcribed_text: text,
                existing_task_json,
            },
        )?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::task_schema());

        let raw = generate_text(&self.llm, request)
            .await?
            .ok_or(PipelineError::Generation { stage: "subtasks" })?;

        let output: Task = schema::parse_validated("subtasks", &raw)?;

        // The input task is the source of truth for everything except the
        // new subtasks: its fields and existing subtasks pass through as-is.
        // Output entries restating an existing subtask are dropped in favor
        // of the originals; a new entry wearing an existing id gets a fresh
        // one instead of colliding.
        let existing_ids: HashSet<String> = task.subtasks.iter().map(|s| s.id.clone()).collect();
        let mut merged = task.clone();
        let mut taken = existing_ids.clone();

        for subtask in output.subtasks {
            let echoes_existing = task
                .subtasks
                .iter()
                .any(|s| s.id == subtask.id && s.text == subtask.text);
            if echoes_existing {
                continue;
            }

            let id = if subtask.id.is_empty() || taken.contains(&subtask.id) {
                fresh_id_avoiding("subtask", &taken)
            } else {
                subtask.id.clone()
            };
            taken.insert(id.clone());

            // New subtasks always start incomplete
            merged.subtasks.push(Subtask {
                id,
                text: subtask.text,
                completed: false,
            });
        }

        debug!(total = merged.subtasks.len(), "augment: done");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationResponse;
    use crate::llm::client::mock::MockClient;

    fn augmenter_with(responses: Vec<GenerationResponse>) -> SubtaskAugmenter {
        SubtaskAugmenter::new(Arc::new(MockClient::new(responses)), Arc::new(PromptLoader::embedded_only()))
    }

    fn task_with_one_done_subtask() -> Task {
        let mut task = Task::new("t1", "Get ready for the beach trip");
        task.subtasks.push(Subtask {
            id: "s1".to_string(),
            text: "Book the hotel".to_string(),
            completed: true,
        });
        task
    }

    #[tokio::test]
    async fn test_appends_new_subtasks_preserving_existing() {
        // Model echoes the existing subtask and adds two new ones
        let output = r#"{
            "id": "t1",
            "task": "Get ready for the beach trip",
            "subtasks": [
                { "id": "s1", "text": "Book the hotel", "completed": true },
                { "id": "new-1", "text": "Pack sunscreen", "completed": false },
                { "id": "new-2", "text": "Buy snacks", "completed": false }
            ]
        }"#;

        let augmenter = augmenter_with(vec![GenerationResponse::text(output)]);
        let task = task_with_one_done_subtask();

        let updated = augmenter
            .augment(&task, "also need to pack sunscreen and buy snacks")
            .await
            .unwrap();

        assert_eq!(updated.subtasks.len(), 3);

        // Original subtask untouched, still first, still completed
        assert_eq!(updated.subtasks[0].id, "s1");
        assert!(updated.subtasks[0].completed);

        // New subtasks are incomplete with fresh distinct ids
        let mut seen = HashSet::new();
        for subtask in &updated.subtasks[1..] {
            assert!(!subtask.completed);
            assert!(!subtask.id.is_empty());
            assert_ne!(subtask.id, "s1");
            assert!(seen.insert(subtask.id.clone()));
        }
    }

    #[tokio::test]
    async fn test_blank_id_subtask_gets_fresh_one() {
        let output = r#"{
            "id": "t1",
            "task": "Get ready for the beach trip",
            "subtasks": [
                { "id": "", "text": "Pack sunscreen", "completed": false }
            ]
        }"#;

        let augmenter = augmenter_with(vec![GenerationResponse::text(output)]);
        let task = task_with_one_done_subtask();

        let updated = augmenter.augment(&task, "pack sunscreen").await.unwrap();
        assert_eq!(updated.subtasks.len(), 2);
        assert!(updated.subtasks[1].id.starts_with("subtask-"));
        assert_ne!(updated.subtasks[1].id, "s1");
    }

    #[tokio::test]
    async fn test_new_subtask_wearing_existing_id_gets_fresh_one() {
        // Model reuses "s1" for a brand-new subtask with different text
        let output = r#"{
            "id": "t1",
            "task": "Get ready for the beach trip",
            "subtasks": [
                { "id": "s1", "text": "Pack sunscreen", "completed": false }
            ]
        }"#;

        let augmenter = augmenter_with(vec![GenerationResponse::text(output)]);
        let task = task_with_one_done_subtask();

        let updated = augmenter.augment(&task, "pack sunscreen").await.unwrap();
        assert_eq!(updated.subtasks.len(), 2);

        // The original keeps its id; the new entry got a fresh one
        assert_eq!(updated.subtasks[0].id, "s1");
        assert_eq!(updated.subtasks[0].text, "Book the hotel");
        assert_ne!(updated.subtasks[1].id, "s1");
        assert_eq!(updated.subtasks[1].text, "Pack sunscreen");
    }

    #[tokio::test]
    async fn test_completed_coerced_to_false_for_new_subtasks() {
        // Model wrongly marks a new subtask completed (and with a bogus type
        // it would have been coerced at parse time already)
        let output = r#"{
            "id": "t1",
            "task": "Get ready for the beach trip",
            "subtasks": [
                { "id": "new-1", "text": "Pack sunscreen", "completed": true }
            ]
        }"#;

        let augmenter = augmenter_with(vec![GenerationResponse::text(output)]);
        let task = task_with_one_done_subtask();

        let updated = augmenter.augment(&task, "pack sunscreen").await.unwrap();
        assert!(!updated.subtasks[1].completed);
    }

    #[tokio::test]
    async fn test_other_task_fields_pass_through() {
        // Model mangles the description; the input task wins
        let output = r#"{
            "id": "t1",
            "task": "Something else entirely",
            "status": "Done",
            "subtasks": [
                { "id": "new-1", "text": "Pack sunscreen", "completed": false }
            ]
        }"#;

        let augmenter = augmenter_with(vec![GenerationResponse::text(output)]);
        let task = task_with_one_done_subtask();

        let updated = augmenter.augment(&task, "pack sunscreen").await.unwrap();
        assert_eq!(updated.task, "Get ready for the beach trip");
        assert_eq!(updated.id, "t1");
        assert_eq!(updated.status, task.status);
    }

    #[tokio::test]
    async fn test_no_output_is_generation_error() {
        let augmenter = augmenter_with(vec![GenerationResponse::empty()]);
        let task = task_with_one_done_subtask();

        let result = augmenter.augment(&task, "anything").await;
        assert!(matches!(result, Err(PipelineError::Generation { stage: "subtasks" })));
    }
}
