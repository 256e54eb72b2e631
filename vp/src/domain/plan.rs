//! Plan and Category domain types
//!
//! A Plan is a titled collection of categorized tasks. Ownership is strictly
//! hierarchical: Plan owns Categories own Tasks own Subtasks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::fresh_id;
use super::task::Task;

/// A named group of tasks within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category name (e.g. "Work", "Personal"); unique within a plan
    pub category: String,

    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            category: name.into(),
            tasks: Vec::new(),
        }
    }
}

/// A titled collection of categorized tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Concise title
    pub title: String,

    /// One-sentence summary
    pub summary: String,

    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Plan {
    /// All task ids currently in the plan
    pub fn task_ids(&self) -> HashSet<String> {
        self.categories
            .iter()
            .flat_map(|c| c.tasks.iter())
            .map(|t| t.id.clone())
            .collect()
    }

    /// All subtask ids currently in the plan
    pub fn subtask_ids(&self) -> HashSet<String> {
        self.categories
            .iter()
            .flat_map(|c| c.tasks.iter())
            .flat_map(|t| t.subtasks.iter())
            .map(|s| s.id.clone())
            .collect()
    }

    /// Total number of tasks across all categories
    pub fn task_count(&self) -> usize {
        self.categories.iter().map(|c| c.tasks.len()).sum()
    }

    /// Find a task anywhere in the plan by id
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.categories
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == task_id)
    }

    /// Replace a task in place by id, wherever it lives
    ///
    /// Returns false when no task with that id exists.
    pub fn replace_task(&mut self, task: Task) -> bool {
        for category in &mut self.categories {
            if let Some(slot) = category.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task;
                return true;
            }
        }
        false
    }

    /// Pure defensive pass assigning synthetic ids to any task or subtask
    /// missing one. Returns a corrected copy; a fully-populated plan comes
    /// back unchanged (idempotent). This is silent self-healing against
    /// model omission, never a reported fault.
    pub fn with_backfilled_ids(mut self) -> Plan {
        for category in &mut self.categories {
            for task in &mut category.tasks {
                if task.id.is_empty() {
                    task.id = fresh_id("task");
                }
                for subtask in &mut task.subtasks {
                    if subtask.id.is_empty() {
                        subtask.id = fresh_id("subtask");
                    }
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Subtask;

    fn sample_plan() -> Plan {
        let mut work = Category::new("Work");
        let mut report = Task::new("t1", "Finish report");
        report.subtasks.push(Subtask::new("s1", "Draft outline"));
        work.tasks.push(report);

        let mut personal = Category::new("Personal");
        personal.tasks.push(Task::new("t2", "Buy groceries"));

        Plan {
            title: "Week Plan".to_string(),
            summary: "Tasks for the week.".to_string(),
            categories: vec![work, personal],
        }
    }

    #[test]
    fn test_task_ids_collects_all_categories() {
        let plan = sample_plan();
        let ids = plan.task_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("t1"));
        assert!(ids.contains("t2"));
    }

    #[test]
    fn test_find_task() {
        let plan = sample_plan();
        assert_eq!(plan.find_task("t2").unwrap().task, "Buy groceries");
        assert!(plan.find_task("nope").is_none());
    }

    #[test]
    fn test_backfill_assigns_missing_ids() {
        let mut plan = sample_plan();
        plan.categories[0].tasks[0].id = String::new();
        plan.categories[0].tasks[0].subtasks[0].id = String::new();

        let fixed = plan.with_backfilled_ids();
        let task = &fixed.categories[0].tasks[0];
        assert!(task.id.starts_with("task-"));
        assert!(task.subtasks[0].id.starts_with("subtask-"));
    }

    #[test]
    fn test_backfill_is_noop_on_populated_plan() {
        let plan = sample_plan();
        let fixed = plan.clone().with_backfilled_ids();
        assert_eq!(plan, fixed);
    }

    #[test]
    fn test_replace_task() {
        let mut plan = sample_plan();
        let mut replacement = Task::new("t2", "Buy groceries and fruit");
        replacement.subtasks.push(Subtask::new("s9", "Apples"));

        assert!(plan.replace_task(replacement));
        assert_eq!(plan.find_task("t2").unwrap().subtasks.len(), 1);

        assert!(!plan.replace_task(Task::new("missing", "Nope")));
    }

    #[test]
    fn test_plan_wire_shape() {
        let plan = sample_plan();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["categories"][0]["category"], "Work");
        assert_eq!(json["categories"][0]["tasks"][0]["task"], "Finish report");
    }
}
