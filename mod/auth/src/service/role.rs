use societies_core::{new_id, now_rfc3339};
use societies_sql::Value;

use crate::model::{CreateRole, RoleRecord};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Create a role catalog entry. Names are unique case-insensitively.
    pub fn create_role(&self, input: CreateRole) -> Result<RoleRecord, AuthError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Role name is required".into()));
        }

        let existing = self
            .sql
            .query(
                "SELECT id FROM roles WHERE name = ?1 COLLATE NOCASE",
                &[Value::text(name)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        if !existing.is_empty() {
            return Err(AuthError::Conflict("Role already exists!".into()));
        }

        let now = now_rfc3339();
        let role = RoleRecord {
            id: new_id(),
            name: name.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "roles",
            &role.id,
            &role,
            &[
                ("name", Value::text(&role.name)),
                ("created_at", Value::text(&now)),
                ("updated_at", Value::text(&now)),
            ],
        )?;
        Ok(role)
    }

    /// Get a role catalog entry by id.
    pub fn get_role(&self, id: &str) -> Result<RoleRecord, AuthError> {
        self.get_record("roles", id)
    }

    /// List the role catalog.
    pub fn list_roles(&self) -> Result<Vec<RoleRecord>, AuthError> {
        let (items, _) = self.list_records("roles", &[], 100, 0)?;
        Ok(items)
    }

    /// Delete a role catalog entry. Grants referencing the name are
    /// left in place; they stop resolving only if the name also leaves
    /// the recognized set.
    pub fn delete_role(&self, id: &str) -> Result<(), AuthError> {
        self.delete_record("roles", id)
    }

    /// Seed a role catalog entry if a role of that name is missing.
    /// Used by server bootstrap; idempotent.
    pub fn ensure_role(&self, name: &str) -> Result<(), AuthError> {
        match self.create_role(CreateRole { name: name.to_string() }) {
            Ok(_) | Err(AuthError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
