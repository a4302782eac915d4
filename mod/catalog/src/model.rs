use serde::{Deserialize, Serialize};

/// A point-bearing activity category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Points awarded per approved logged activity (per participant for
    /// multi-participant types).
    pub value: i64,
    #[serde(default)]
    pub supports_multiple_participants: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityType {
    pub name: String,
    pub description: String,
    pub value: i64,
    #[serde(default)]
    pub supports_multiple_participants: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityType {
    pub name: Option<String>,
    pub description: Option<String>,
    pub value: Option<i64>,
    pub supports_multiple_participants: Option<bool>,
}

/// A concrete occurrence of an activity type on a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub activity_type_id: String,
    /// Occurrence date, `YYYY-MM-DD`.
    pub activity_date: String,
    pub added_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activity_type_id: String,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
}
