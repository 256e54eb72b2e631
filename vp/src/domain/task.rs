//! Task and Subtask domain types

use serde::{Deserialize, Deserializer, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToDo => write!(f, "To Do"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// A reminder attached to a task: when to fire and what to ask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Time for the reminder, as spoken (e.g. "5pm tomorrow")
    pub time: String,
    /// Question to ask the user in the notification
    pub question: String,
}

/// A subtask within a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    /// Unique within the parent task's subtask list
    #[serde(default)]
    pub id: String,

    /// Subtask description
    pub text: String,

    /// Completion flag; non-boolean model output is coerced to false
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
}

impl Subtask {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        }
    }
}

/// A single task within a plan category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned exactly once at creation, never regenerated on update
    #[serde(default)]
    pub id: String,

    /// Task description (non-empty)
    pub task: String,

    /// Single representative emoji
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    /// Deadline, as spoken (e.g. "2:00 PM")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// People associated with the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<String>>,

    /// Organizations associated with the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<String>>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Create a bare task with just an id and description
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task: description.into(),
            emoji: None,
            deadline: None,
            priority: None,
            people: None,
            organizations: None,
            status: TaskStatus::ToDo,
            reminder: None,
            subtasks: Vec::new(),
        }
    }
}

/// Deserialize a bool, silently coercing missing or non-boolean values to false
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}
