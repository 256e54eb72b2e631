//! User insight types

use serde::{Deserialize, Serialize};

/// A single encouraging observation about the user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Single representative emoji
    pub emoji: String,

    /// Concise, encouraging insight text
    pub text: String,
}

/// Insights derived from the user's plan and itinerary history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInsights {
    /// 3-5 personalized insights
    pub insights: Vec<Insight>,

    /// Most productive day of the week, when a clear pattern exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productivity_peak: Option<String>,
}
