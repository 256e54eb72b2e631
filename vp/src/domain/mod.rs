//! Domain types for VoicePlan
//!
//! Value-like aggregates with strictly hierarchical ownership:
//! Plan owns Categories own Tasks own Subtasks; Itinerary owns
//! ItineraryDays own ItineraryActivities.

mod id;
mod insight;
mod itinerary;
mod plan;
mod stored;
mod task;

pub use id::{fresh_id, fresh_id_avoiding, record_id};
pub use insight::{Insight, UserInsights};
pub use itinerary::{ActivityType, Itinerary, ItineraryActivity, ItineraryDay};
pub use plan::{Category, Plan};
pub use stored::{StoredItinerary, StoredPlan};
pub use task::{Priority, Reminder, Subtask, Task, TaskStatus};
