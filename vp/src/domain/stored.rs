//! Stored record envelopes
//!
//! A StoredPlan/StoredItinerary is the generated payload plus persistence
//! metadata. The pipeline produces payloads; metadata is stamped at the
//! orchestration boundary when a record is created or updated.

use serde::{Deserialize, Serialize};

use planstore::{Record, now_ms};

use super::id::record_id;
use super::itinerary::Itinerary;
use super::plan::Plan;

/// A persisted plan with ownership and provenance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub id: String,

    /// Owning user identifier
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Creation timestamp (Unix milliseconds)
    #[serde(rename = "createdAt")]
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,

    /// The transcription this plan was generated from
    pub transcription: String,

    #[serde(flatten)]
    pub plan: Plan,
}

impl StoredPlan {
    /// Wrap a freshly generated plan with new metadata
    pub fn new(user_id: impl Into<String>, transcription: impl Into<String>, plan: Plan) -> Self {
        let now = now_ms();
        Self {
            id: record_id(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
            transcription: transcription.into(),
            plan,
        }
    }

    /// Replace the payload after a voice update, refreshing the update stamp
    pub fn with_updated_plan(mut self, plan: Plan, transcription: impl Into<String>) -> Self {
        self.plan = plan;
        self.transcription = transcription.into();
        self.updated_at = now_ms();
        self
    }
}

impl Record for StoredPlan {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "plans"
    }
}

/// A persisted itinerary with ownership and provenance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItinerary {
    pub id: String,

    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "createdAt")]
    pub created_at: i64,

    #[serde(rename = "updatedAt")]
    pub updated_at: i64,

    pub transcription: String,

    #[serde(flatten)]
    pub itinerary: Itinerary,
}

impl StoredItinerary {
    /// Wrap a freshly generated itinerary with new metadata
    pub fn new(user_id: impl Into<String>, transcription: impl Into<String>, itinerary: Itinerary) -> Self {
        let now = now_ms();
        Self {
            id: record_id(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
            transcription: transcription.into(),
            itinerary,
        }
    }

    /// Replace the payload after a voice update, refreshing the update stamp
    pub fn with_updated_itinerary(mut self, itinerary: Itinerary, transcription: impl Into<String>) -> Self {
        self.itinerary = itinerary;
        self.transcription = transcription.into();
        self.updated_at = now_ms();
        self
    }
}

impl Record for StoredItinerary {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "itineraries"
    }
}
