use serde::{Deserialize, Serialize};

/// JWT claims issued by the identity provider.
///
/// `cohort` and `center` are optional; when absent they are filled from
/// the staff directory during claim enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity provider subject, reused as the user id.
    pub sub: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub cohort: Option<String>,
    #[serde(default)]
    pub center: Option<String>,
    /// Role names as the provider spells them. Unrecognized names are
    /// dropped at resolution time.
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

/// A provisioned user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub society_id: Option<String>,
    #[serde(default)]
    pub cohort_id: Option<String>,
    #[serde(default)]
    pub center_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// An entry in the catalog of assignable roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
}

/// Role assignment payload for `PUT /users/{id}/roles`.
#[derive(Debug, Deserialize)]
pub struct AssignRoles {
    pub roles: Vec<String>,
}
