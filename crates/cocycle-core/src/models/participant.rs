use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_default;

/// A user's membership record against a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Participant {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Self-described riding level ("Beginner", "Intermediate", ...)
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_default")]
    pub is_creator: bool,
}
