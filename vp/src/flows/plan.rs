//! Plan generator
//!
//! Creates a categorized task list from transcribed text, or merges new
//! text into an existing plan without losing data. The structural pass is
//! one model call; per-task detail enrichment fans out to the task detail
//! extractor, one concurrent call per task, each merging back into its own
//! slot only.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Category, Plan, Task};
use crate::error::PipelineError;
use crate::llm::{GenerationRequest, GenerativeClient};
use crate::prompts::PromptLoader;
use crate::schema;

use super::task_details::{TaskDetailExtractor, TaskDetails};
use super::{generate_text, render_prompt};

const MAX_TOKENS: u32 = 8192;

/// Input for plan generation
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub transcribed_text: String,

    /// Prior plan for update mode; None creates from scratch
    pub existing_plan: Option<Plan>,

    /// Optional template hint guiding the plan structure
    pub template: Option<String>,
}

impl PlanRequest {
    /// Creation-mode request
    pub fn create(transcribed_text: impl Into<String>) -> Self {
        Self {
            transcribed_text: transcribed_text.into(),
            existing_plan: None,
            template: None,
        }
    }

    /// Update-mode request
    pub fn update(transcribed_text: impl Into<String>, existing_plan: Plan) -> Self {
        Self {
            transcribed_text: transcribed_text.into(),
            existing_plan: Some(existing_plan),
            template: None,
        }
    }
}

#[derive(Serialize)]
struct CreateContext<'a> {
    transcribed_text: &'a str,
    template: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateContext<'a> {
    transcribed_text: &'a str,
    existing_plan_json: String,
}

/// Generates and updates plans
pub struct PlanGenerator {
    llm: Arc<dyn GenerativeClient>,
    prompts: Arc<PromptLoader>,
    extractor: TaskDetailExtractor,
}

impl PlanGenerator {
    pub fn new(llm: Arc<dyn GenerativeClient>, prompts: Arc<PromptLoader>) -> Self {
        let extractor = TaskDetailExtractor::new(llm.clone(), prompts.clone());
        Self { llm, prompts, extractor }
    }

    /// Generate a plan from the request
    ///
    /// Fails with [`PipelineError::Generation`] when the structural step
    /// returns no output. Per-task enrichment failures are logged and the
    /// task is kept with its structural fields.
    pub async fn generate(&self, request: &PlanRequest) -> Result<Plan, PipelineError> {
        match &request.existing_plan {
            None => self.create(&request.transcribed_text, request.template.as_deref()).await,
            Some(prior) => self.update(&request.transcribed_text, prior).await,
        }
    }

    /// Creation mode: structural pass with bare descriptions, then every
    /// task is enriched
    async fn create(&self, text: &str, template: Option<&str>) -> Result<Plan, PipelineError> {
        debug!("create: generating new plan");

        let prompt = render_prompt(
            &self.prompts,
            "plan-create",
            &CreateContext {
                transcribed_text: text,
                template,
            },
        )?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::plan_structure_schema());

        let raw = generate_text(&self.llm, request)
            .await?
            .ok_or(PipelineError::Generation { stage: "plan" })?;

        let plan: Plan = schema::parse_validated("plan", &raw)?;
        let plan = plan.with_backfilled_ids();

        // All tasks are new; enrich every one. Categories came from the
        // structural pass, so the extracted label is not applied here.
        let targets = plan.task_ids();
        Ok(self.enrich(plan, &targets, false).await)
    }

    /// Update mode: structural merge preserving ids, then enrichment of
    /// tasks that did not exist before
    async fn update(&self, text: &str, prior: &Plan) -> Result<Plan, PipelineError> {
        debug!(prior_tasks = prior.task_count(), "update: merging into existing plan");

        let existing_plan_json = serde_json::to_string_pretty(prior)
            .map_err(|source| PipelineError::Validation { stage: "plan", source })?;

        let prompt = render_prompt(
            &self.prompts,
            "plan-update",
            &UpdateContext {
                transcribed_text: text,
                existing_plan_json,
            },
        )?;
        let request = GenerationRequest::new(prompt, MAX_TOKENS).with_schema(schema::plan_schema());

        let raw = generate_text(&self.llm, request)
            .await?
            .ok_or(PipelineError::Generation { stage: "plan" })?;

        let plan: Plan = schema::parse_validated("plan", &raw)?;
        let plan = plan.with_backfilled_ids();

        // Tasks whose id was not in the prior plan are newly created; a
        // task that came back without an id got a fresh one above and lands
        // in this set too.
        let original_ids = prior.task_ids();
        let new_ids: HashSet<String> = plan
            .task_ids()
            .into_iter()
            .filter(|id| !original_ids.contains(id))
            .collect();

        debug!(new_tasks = new_ids.len(), "update: enriching new tasks");
        Ok(self.enrich(plan, &new_ids, true).await)
    }

    /// Fan-out enrichment of the targeted tasks
    ///
    /// One concurrent extractor call per task; each result merges into its
    /// own task slot only. Failures keep the task unenriched. When
    /// `apply_category` is set, the extracted label re-buckets the task by
    /// exact name match.
    async fn enrich(&self, mut plan: Plan, targets: &HashSet<String>, apply_category: bool) -> Plan {
        let jobs: Vec<(usize, usize, String)> = plan
            .categories
            .iter()
            .enumerate()
            .flat_map(|(ci, category)| {
                category
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| targets.contains(&task.id))
                    .map(move |(ti, task)| (ci, ti, task.task.clone()))
            })
            .collect();

        if jobs.is_empty() {
            return plan;
        }

        let results = future::join_all(jobs.iter().map(|(_, _, description)| self.extractor.extract(description))).await;

        let mut moves: Vec<(String, String)> = Vec::new();
        for ((ci, ti, _), result) in jobs.iter().zip(results) {
            match result {
                Ok(details) => {
                    let bucket = plan.categories[*ci].category.clone();
                    let task = &mut plan.categories[*ci].tasks[*ti];
                    apply_details(task, &details);
                    if apply_category && bucket != details.category {
                        moves.push((task.id.clone(), details.category));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "enrich: task detail extraction failed; keeping task unenriched");
                }
            }
        }

        if moves.is_empty() { plan } else { rebucket(plan, moves) }
    }
}

/// Merge extracted details onto a task, filling only missing fields and
/// preserving status
fn apply_details(task: &mut Task, details: &TaskDetails) {
    if task.priority.is_none() {
        task.priority = Some(details.priority);
    }
    if task.emoji.is_none() {
        task.emoji = Some(details.emoji.clone());
    }
    if task.deadline.is_none() {
        task.deadline = details.deadline.clone();
    }
}

/// Move tasks into the bucket named by their extracted category
///
/// Matching is exact string equality on the category name; a label that
/// matches no existing bucket creates a new one at the end. Buckets
/// emptied by moves are dropped.
fn rebucket(mut plan: Plan, moves: Vec<(String, String)>) -> Plan {
    for (task_id, label) in moves {
        let mut moved: Option<Task> = None;
        for category in &mut plan.categories {
            if category.category == label {
                continue;
            }
            if let Some(pos) = category.tasks.iter().position(|t| t.id == task_id) {
                moved = Some(category.tasks.remove(pos));
                break;
            }
        }

        if let Some(task) = moved {
            if let Some(category) = plan.categories.iter_mut().find(|c| c.category == label) {
                category.tasks.push(task);
            } else {
                let mut category = Category::new(label);
                category.tasks.push(task);
                plan.categories.push(category);
            }
        }
    }

    plan.categories.retain(|c| !c.tasks.is_empty());
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskStatus};
    use crate::llm::GenerationResponse;
    use crate::llm::client::mock::MockClient;

    fn generator_with(responses: Vec<GenerationResponse>) -> PlanGenerator {
        PlanGenerator::new(Arc::new(MockClient::new(responses)), Arc::new(PromptLoader::embedded_only()))
    }

    fn details_response(category: &str, priority: &str, deadline: &str, emoji: &str) -> GenerationResponse {
        GenerationResponse::text(format!(
            r#"{{"task": "x", "category": "{}", "deadline": "{}", "priority": "{}", "emoji": "{}"}}"#,
            category, deadline, priority, emoji
        ))
    }

    #[tokio::test]
    async fn test_create_enriches_every_task() {
        let structure = r#"{
            "title": "Daily Plan",
            "summary": "Gym, work, and study.",
            "categories": [
                { "category": "Personal", "tasks": [{ "task": "Go to the gym" }] },
                { "category": "Work", "tasks": [{ "task": "Do work" }, { "task": "Study" }] }
            ]
        }"#;

        let generator = generator_with(vec![
            GenerationResponse::text(structure),
            details_response("Health", "High", "7:00 AM", "🏋️"),
            details_response("Work", "High", "10:00 AM", "💻"),
            details_response("Learning", "Medium", "7:00 PM", "📚"),
        ]);

        let plan = generator
            .generate(&PlanRequest::create("go to the gym, do work, and study"))
            .await
            .unwrap();

        assert_eq!(plan.task_count(), 3);
        for category in &plan.categories {
            for task in &category.tasks {
                assert!(!task.id.is_empty());
                assert!(task.deadline.is_some(), "deadline missing on {}", task.task);
                assert!(task.priority.is_some());
                assert!(task.emoji.is_some());
                assert_eq!(task.status, TaskStatus::ToDo);
            }
        }

        // Creation mode keeps the structural buckets
        let names: Vec<&str> = plan.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Personal", "Work"]);
    }

    #[tokio::test]
    async fn test_create_no_output_is_generation_error() {
        let generator = generator_with(vec![GenerationResponse::empty()]);
        let result = generator.generate(&PlanRequest::create("anything")).await;
        assert!(matches!(result, Err(PipelineError::Generation { stage: "plan" })));
    }

    fn prior_plan() -> Plan {
        serde_json::from_str(
            r#"{
            "title": "Errands",
            "summary": "Things to do.",
            "categories": [
                { "category": "Personal", "tasks": [
                    { "id": "t1", "task": "Buy milk", "status": "Done", "priority": "Low", "emoji": "🥛" }
                ]}
            ]
        }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_preserves_existing_ids_and_enriches_new_tasks() {
        let updated = r#"{
            "title": "Errands",
            "summary": "Things to do.",
            "categories": [
                { "category": "Personal", "tasks": [
                    { "id": "t1", "task": "Buy milk", "status": "Done", "priority": "Low", "emoji": "🥛" },
                    { "id": "t2-new", "task": "Call the dentist" }
                ]}
            ]
        }"#;

        let generator = generator_with(vec![
            GenerationResponse::text(updated),
            details_response("Personal", "Medium", "tomorrow", "🦷"),
        ]);

        let plan = generator
            .generate(&PlanRequest::update("also call the dentist", prior_plan()))
            .await
            .unwrap();

        let existing = plan.find_task("t1").unwrap();
        assert_eq!(existing.status, TaskStatus::Done);
        assert_eq!(existing.priority, Some(Priority::Low));

        let new_task = plan.find_task("t2-new").unwrap();
        assert_eq!(new_task.priority, Some(Priority::Medium));
        assert_eq!(new_task.emoji.as_deref(), Some("🦷"));
        assert_eq!(new_task.deadline.as_deref(), Some("tomorrow"));
        assert_eq!(new_task.status, TaskStatus::ToDo);
    }

    #[tokio::test]
    async fn test_update_keeps_new_task_when_enrichment_fails() {
        let updated = r#"{
            "title": "Errands",
            "summary": "Things to do.",
            "categories": [
                { "category": "Personal", "tasks": [
                    { "id": "t1", "task": "Buy milk", "status": "Done" },
                    { "id": "t2-new", "task": "Call the dentist" }
                ]}
            ]
        }"#;

        // Structural pass succeeds, extractor returns no output
        let generator = generator_with(vec![GenerationResponse::text(updated), GenerationResponse::empty()]);

        let plan = generator
            .generate(&PlanRequest::update("also call the dentist", prior_plan()))
            .await
            .unwrap();

        let new_task = plan.find_task("t2-new").unwrap();
        assert_eq!(new_task.task, "Call the dentist");
        assert!(new_task.priority.is_none());
        assert!(new_task.emoji.is_none());
    }

    #[tokio::test]
    async fn test_update_backfills_missing_task_id_and_enriches_it() {
        let updated = r#"{
            "title": "Errands",
            "summary": "Things to do.",
            "categories": [
                { "category": "Personal", "tasks": [
                    { "id": "t1", "task": "Buy milk", "status": "Done" },
                    { "task": "Water the plants" }
                ]}
            ]
        }"#;

        let generator = generator_with(vec![
            GenerationResponse::text(updated),
            details_response("Personal", "Low", "tonight", "🪴"),
        ]);

        let plan = generator
            .generate(&PlanRequest::update("water the plants too", prior_plan()))
            .await
            .unwrap();

        let new_task = plan
            .categories
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.task == "Water the plants")
            .unwrap();
        assert!(new_task.id.starts_with("task-"));
        assert_eq!(new_task.priority, Some(Priority::Low));
    }

    #[tokio::test]
    async fn test_update_rebuckets_new_task_by_extracted_category() {
        let updated = r#"{
            "title": "Errands",
            "summary": "Things to do.",
            "categories": [
                { "category": "Personal", "tasks": [
                    { "id": "t1", "task": "Buy milk", "status": "Done" },
                    { "id": "t2-new", "task": "Prepare the quarterly report" }
                ]}
            ]
        }"#;

        let generator = generator_with(vec![
            GenerationResponse::text(updated),
            details_response("Work", "High", "Friday", "📊"),
        ]);

        let plan = generator
            .generate(&PlanRequest::update("add the quarterly report", prior_plan()))
            .await
            .unwrap();

        let work = plan.categories.iter().find(|c| c.category == "Work").unwrap();
        assert!(work.tasks.iter().any(|t| t.id == "t2-new"));
        let personal = plan.categories.iter().find(|c| c.category == "Personal").unwrap();
        assert!(!personal.tasks.iter().any(|t| t.id == "t2-new"));
    }

    #[test]
    fn test_rebucket_exact_match_is_case_sensitive() {
        let plan: Plan = serde_json::from_str(
            r#"{
            "title": "P", "summary": "S",
            "categories": [
                { "category": "Work", "tasks": [{ "id": "a", "task": "A" }, { "id": "b", "task": "B" }] }
            ]
        }"#,
        )
        .unwrap();

        // "work" (lowercase) does not match "Work" and creates a second bucket
        let plan = rebucket(plan, vec![("b".to_string(), "work".to_string())]);
        let names: Vec<&str> = plan.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Work", "work"]);
    }

    #[test]
    fn test_rebucket_drops_emptied_buckets() {
        let plan: Plan = serde_json::from_str(
            r#"{
            "title": "P", "summary": "S",
            "categories": [
                { "category": "Misc", "tasks": [{ "id": "a", "task": "A" }] },
                { "category": "Work", "tasks": [{ "id": "b", "task": "B" }] }
            ]
        }"#,
        )
        .unwrap();

        let plan = rebucket(plan, vec![("a".to_string(), "Work".to_string())]);
        assert_eq!(plan.categories.len(), 1);
        assert_eq!(plan.categories[0].category, "Work");
        assert_eq!(plan.categories[0].tasks.len(), 2);
    }

    #[test]
    fn test_apply_details_fills_only_missing_fields() {
        let mut task = Task::new("t1", "Buy milk");
        task.deadline = Some("already set".to_string());

        let details = TaskDetails {
            task: "Buy milk".to_string(),
            category: "Personal".to_string(),
            deadline: Some("5pm".to_string()),
            priority: Priority::Low,
            emoji: "🥛".to_string(),
        };

        apply_details(&mut task, &details);
        assert_eq!(task.deadline.as_deref(), Some("already set"));
        assert_eq!(task.priority, Some(Priority::Low));
        assert_eq!(task.emoji.as_deref(), Some("🥛"));
    }
}
