use std::collections::BTreeSet;

use societies_core::{PageParams, Role, now_rfc3339};
use societies_sql::Value;

use crate::model::User;
use crate::service::{AuthError, AuthService};

/// Roles that make a user a society executive.
const EXEC_ROLES: &[Role] = &[
    Role::SocietyPresident,
    Role::VicePresident,
    Role::SocietySecretary,
];

impl AuthService {
    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_record("users", id)
    }

    /// List users with pagination, newest first.
    pub fn list_users(&self, params: &PageParams) -> Result<(Vec<User>, usize), AuthError> {
        let params = params.normalized();
        self.list_records("users", &[], params.limit, params.offset())
    }

    /// The resolved role set of a user.
    pub fn user_roles(&self, user_id: &str) -> Result<BTreeSet<Role>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT role FROM user_roles WHERE user_id = ?1",
                &[Value::text(user_id)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("role"))
            .filter_map(Role::parse)
            .collect())
    }

    /// Replace a user's role grants.
    pub fn assign_roles(&self, user_id: &str, role_names: &[String]) -> Result<BTreeSet<Role>, AuthError> {
        let mut roles = BTreeSet::new();
        for name in role_names {
            let role = Role::parse(name)
                .ok_or_else(|| AuthError::Validation(format!("Invalid role: {name}")))?;
            roles.insert(role);
        }
        if roles.is_empty() {
            return Err(AuthError::Validation("At least one role is required".into()));
        }

        // 404 if the user does not exist
        self.get_user(user_id)?;

        self.sql
            .exec(
                "DELETE FROM user_roles WHERE user_id = ?1",
                &[Value::text(user_id)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        for role in &roles {
            self.grant_role(user_id, *role)?;
        }

        Ok(roles)
    }

    /// Everyone holding a society executive role. Used by success ops
    /// to audit who can act for a society.
    pub fn society_execs(&self) -> Result<Vec<User>, AuthError> {
        let placeholders: Vec<String> =
            (1..=EXEC_ROLES.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT DISTINCT u.data AS data FROM users u
             JOIN user_roles ur ON ur.user_id = u.id
             WHERE ur.role IN ({}) ORDER BY u.name",
            placeholders.join(", "),
        );
        let params: Vec<Value> = EXEC_ROLES.iter().map(|r| Value::text(r.as_str())).collect();

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let mut users = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
            users.push(
                serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?,
            );
        }
        Ok(users)
    }

    /// Everyone holding one specific role.
    pub fn users_with_role(&self, role: Role) -> Result<Vec<User>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT u.data AS data FROM users u
                 JOIN user_roles ur ON ur.user_id = u.id
                 WHERE ur.role = ?1 ORDER BY u.name",
                &[Value::text(role.as_str())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let mut users = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
            users.push(
                serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?,
            );
        }
        Ok(users)
    }

    /// Attach a user to a society directly, bypassing cohort inference.
    pub fn set_user_society(&self, user_id: &str, society_id: &str) -> Result<User, AuthError> {
        let mut user = self.get_user(user_id)?;
        user.society_id = Some(society_id.to_string());
        user.updated_at = now_rfc3339();
        self.update_record(
            "users",
            user_id,
            &user,
            &[
                ("society_id", Value::text(society_id)),
                ("updated_at", Value::text(&user.updated_at)),
            ],
        )?;
        Ok(user)
    }
}
