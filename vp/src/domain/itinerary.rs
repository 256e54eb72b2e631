//! Itinerary domain types
//!
//! A titled, dated, multi-day travel schedule. Unlike plans, an itinerary
//! update replaces the whole structure; there is no field-level merge.

use serde::{Deserialize, Serialize};

use super::id::fresh_id;

/// Kind of itinerary activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Travel,
    Food,
    Activity,
    Lodging,
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Travel => write!(f, "travel"),
            Self::Food => write!(f, "food"),
            Self::Activity => write!(f, "activity"),
            Self::Lodging => write!(f, "lodging"),
        }
    }
}

/// A single scheduled activity within a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryActivity {
    #[serde(default)]
    pub id: String,

    /// Time of day, as spoken (e.g. "9:00 AM")
    pub time: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    #[serde(rename = "type")]
    pub activity_type: ActivityType,
}

/// One day of the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// 1-based, contiguous day number
    pub day: u32,

    /// Theme title for the day (e.g. "Arrival and Exploration")
    pub title: String,

    #[serde(default)]
    pub activities: Vec<ItineraryActivity>,
}

/// A titled, dated travel schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub title: String,

    /// Start date (e.g. "2024-12-20")
    pub start_date: String,

    /// End date (e.g. "2024-12-27")
    pub end_date: String,

    #[serde(default)]
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    /// Total number of activities across all days
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|d| d.activities.len()).sum()
    }

    /// Pure defensive pass assigning synthetic ids to any activity missing
    /// one. Returns a corrected copy; idempotent on populated itineraries.
    pub fn with_backfilled_ids(mut self) -> Itinerary {
        for day in &mut self.days {
            for activity in &mut day.activities {
                if activity.id.is_empty() {
                    activity.id = fresh_id("activity");
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_itinerary() -> Itinerary {
        Itinerary {
            title: "Weekend in Lisbon".to_string(),
            start_date: "2026-06-01".to_string(),
            end_date: "2026-06-03".to_string(),
            days: vec![ItineraryDay {
                day: 1,
                title: "Arrival".to_string(),
                activities: vec![ItineraryActivity {
                    id: "a1".to_string(),
                    time: "9:00 AM".to_string(),
                    description: "Flight to Lisbon".to_string(),
                    emoji: Some("✈️".to_string()),
                    activity_type: ActivityType::Travel,
                }],
            }],
        }
    }

    #[test]
    fn test_activity_type_wire_names() {
        assert_eq!(serde_json::to_string(&ActivityType::Lodging).unwrap(), "\"lodging\"");
        let t: ActivityType = serde_json::from_str("\"food\"").unwrap();
        assert_eq!(t, ActivityType::Food);
    }

    #[test]
    fn test_itinerary_wire_shape_is_camel_case() {
        let json = serde_json::to_value(sample_itinerary()).unwrap();
        assert_eq!(json["startDate"], "2026-06-01");
        assert_eq!(json["endDate"], "2026-06-03");
        assert_eq!(json["days"][0]["activities"][0]["type"], "travel");
    }

    #[test]
    fn test_backfill_assigns_missing_activity_ids() {
        let mut itinerary = sample_itinerary();
        itinerary.days[0].activities[0].id = String::new();

        let fixed = itinerary.with_backfilled_ids();
        assert!(fixed.days[0].activities[0].id.starts_with("activity-"));
    }

    #[test]
    fn test_backfill_is_noop_on_populated_itinerary() {
        let itinerary = sample_itinerary();
        let fixed = itinerary.clone().with_backfilled_ids();
        assert_eq!(itinerary, fixed);
    }
}
