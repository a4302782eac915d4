use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ActivityStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a logged activity.
///
/// ```text
/// in review → pending  → approved
///           → rejected → rejected
/// ```
///
/// The secretary moves `in review` to `pending` or `rejected`; success
/// ops moves `pending` to `approved` or `rejected`. `rejected` and
/// `approved` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[serde(rename = "in review")]
    InReview,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InReview => "in review",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "in review" => Some(Self::InReview),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RedemptionStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a redemption request.
///
/// ```text
/// pending  → approved → completed
///          → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Society — maps 1:1 to SQL columns
// ---------------------------------------------------------------------------

/// A society and its point balance. `remaining_points` is computed on
/// read, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Society {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub total_points: i64,
    pub used_points: i64,
    pub remaining_points: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSociety {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color_scheme: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSociety {
    pub name: Option<String>,
    pub color_scheme: Option<String>,
    pub logo: Option<String>,
    pub photo: Option<String>,
}

// ---------------------------------------------------------------------------
// LoggedActivity
// ---------------------------------------------------------------------------

/// A member's claim to points for an activity they took part in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedActivity {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Points this record is worth, fixed at log time.
    pub value: i64,
    pub status: ActivityStatus,
    /// `YYYY-MM-DD`, resolved from the occurrence or the request.
    pub activity_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_of_participants: Option<i64>,
    #[serde(default)]
    pub redeemed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    pub user_id: String,
    pub society_id: String,
    pub activity_type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for logging or editing an activity. Points resolve either
/// from a concrete occurrence (`activity_id`) or from a type plus date.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActivityInput {
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub activity_type_id: Option<String>,
    /// `YYYY-MM-DD`. Required with `activity_type_id`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub no_of_participants: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Secretary review payload: target status `pending` or `rejected`.
#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub status: String,
}

/// Bulk approval payload for success ops.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkApproveInput {
    #[serde(default)]
    pub logged_activities_ids: Vec<String>,
}

/// More-info request payload: the comment is relayed to the logger.
#[derive(Debug, Deserialize)]
pub struct InfoRequestInput {
    #[serde(default)]
    pub comment: String,
}

// ---------------------------------------------------------------------------
// RedemptionRequest
// ---------------------------------------------------------------------------

/// A society president's request to spend accumulated points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub id: String,
    /// Short reason, e.g. "End of year dinner".
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub description: String,
    pub status: RedemptionStatus,
    /// Reason given on rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub user_id: String,
    pub society_id: String,
    pub center_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedemption {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub description: String,
    /// Center name, e.g. "Nairobi".
    #[serde(default)]
    pub center: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRedemption {
    pub name: Option<String>,
    pub value: Option<i64>,
    pub description: Option<String>,
}

/// Verification payload: `approved`, `rejected` (with a reason), or a
/// bare comment which is relayed without a status change.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRedemptionInput {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rejection: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Completion payload for finance; the only accepted status is
/// `completed`.
#[derive(Debug, Deserialize)]
pub struct CompleteRedemptionInput {
    #[serde(default)]
    pub status: String,
}

/// List filters for redemption requests.
#[derive(Debug, Default, Deserialize)]
pub struct RedemptionFilters {
    #[serde(default)]
    pub society: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub center: Option<String>,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub society_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Center {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCohort {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub center_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCenter {
    #[serde(default)]
    pub name: String,
}

/// Cohort-link payload for `POST /societies/{id}/cohorts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCohort {
    #[serde(default)]
    pub cohort_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_status_round_trips() {
        for s in [
            ActivityStatus::InReview,
            ActivityStatus::Pending,
            ActivityStatus::Approved,
            ActivityStatus::Rejected,
        ] {
            assert_eq!(ActivityStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(ActivityStatus::from_str("In Review"), Some(ActivityStatus::InReview));
        assert_eq!(ActivityStatus::from_str("done"), None);
    }

    #[test]
    fn activity_status_serializes_with_space() {
        let json = serde_json::to_string(&ActivityStatus::InReview).unwrap();
        assert_eq!(json, "\"in review\"");
    }

    #[test]
    fn redemption_status_round_trips() {
        for s in [
            RedemptionStatus::Pending,
            RedemptionStatus::Approved,
            RedemptionStatus::Rejected,
            RedemptionStatus::Completed,
        ] {
            assert_eq!(RedemptionStatus::from_str(s.as_str()), Some(s));
        }
    }
}
