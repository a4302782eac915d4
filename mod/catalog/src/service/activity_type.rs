use societies_core::{new_id, now_rfc3339};
use societies_sql::Value;
use tracing::info;

use crate::model::{ActivityType, CreateActivityType, UpdateActivityType};
use crate::service::{CatalogError, CatalogService};

/// Activity flows handled outside the logging pipeline. Occurrences of
/// these types cannot be created.
pub const DISALLOWED_TYPES: &[&str] = &["Blog", "App", "Open Source"];

/// Whether `haystack` contains `phrase` as whole words, ignoring case.
/// Plain substring search would flag "Happy Hour" for "App".
pub(crate) fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let h = haystack.to_lowercase();
    let p = phrase.to_lowercase();
    let mut start = 0;
    while let Some(pos) = h[start..].find(&p) {
        let at = start + pos;
        let end = at + p.len();
        let before_ok = at == 0 || !h.as_bytes()[at - 1].is_ascii_alphanumeric();
        let after_ok = end == h.len() || !h.as_bytes()[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
        start = at + 1;
    }
    false
}

/// Whether a type name belongs to a disallowed flow.
pub fn is_disallowed_type(name: &str) -> bool {
    DISALLOWED_TYPES.iter().any(|t| contains_phrase(name, t))
}

impl CatalogService {
    /// Create an activity type. Names are unique case-insensitively.
    pub fn create_activity_type(
        &self,
        input: CreateActivityType,
    ) -> Result<ActivityType, CatalogError> {
        let name = input.name.trim();
        if name.is_empty() || input.description.trim().is_empty() {
            return Err(CatalogError::Validation(
                "Name and description are required".into(),
            ));
        }
        if input.value <= 0 {
            return Err(CatalogError::Validation("Value must be a positive number".into()));
        }

        let existing = self
            .sql
            .query(
                "SELECT id FROM activity_types WHERE name = ?1 COLLATE NOCASE",
                &[Value::text(name)],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if !existing.is_empty() {
            return Err(CatalogError::Conflict("Activity type already exists!".into()));
        }

        let now = now_rfc3339();
        let activity_type = ActivityType {
            id: new_id(),
            name: name.to_string(),
            description: input.description.trim().to_string(),
            value: input.value,
            supports_multiple_participants: input.supports_multiple_participants,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "activity_types",
            &activity_type.id,
            &activity_type,
            &[
                ("name", Value::text(&activity_type.name)),
                ("created_at", Value::text(&now)),
                ("updated_at", Value::text(&now)),
            ],
        )?;
        info!(id = %activity_type.id, name = %activity_type.name,
              value = activity_type.value, "activity type created");
        Ok(activity_type)
    }

    /// Get an activity type by id.
    pub fn get_activity_type(&self, id: &str) -> Result<ActivityType, CatalogError> {
        self.get_record("activity_types", id)
    }

    /// List the full type catalog.
    pub fn list_activity_types(&self) -> Result<Vec<ActivityType>, CatalogError> {
        let (items, _) = self.list_records("activity_types", &[], 100, 0)?;
        Ok(items)
    }

    /// Update an activity type. The new value applies only to activities
    /// logged after the change.
    pub fn update_activity_type(
        &self,
        id: &str,
        patch: UpdateActivityType,
    ) -> Result<ActivityType, CatalogError> {
        let mut current = self.get_activity_type(id)?;

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::Validation("Name cannot be empty".into()));
            }
            current.name = name;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(value) = patch.value {
            if value <= 0 {
                return Err(CatalogError::Validation("Value must be a positive number".into()));
            }
            current.value = value;
        }
        if let Some(multi) = patch.supports_multiple_participants {
            current.supports_multiple_participants = multi;
        }
        current.updated_at = now_rfc3339();

        self.update_record(
            "activity_types",
            id,
            &current,
            &[
                ("name", Value::text(&current.name)),
                ("updated_at", Value::text(&current.updated_at)),
            ],
        )?;
        Ok(current)
    }

    /// Delete an activity type.
    pub fn delete_activity_type(&self, id: &str) -> Result<(), CatalogError> {
        self.delete_record("activity_types", id)
    }

    /// Seed a type if one of that name is missing. Used by server
    /// bootstrap; idempotent.
    pub fn ensure_activity_type(
        &self,
        name: &str,
        description: &str,
        value: i64,
        supports_multiple_participants: bool,
    ) -> Result<(), CatalogError> {
        match self.create_activity_type(CreateActivityType {
            name: name.to_string(),
            description: description.to_string(),
            value,
            supports_multiple_participants,
        }) {
            Ok(_) | Err(CatalogError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use societies_sql::sqlite::SqliteStore;

    use super::*;

    fn test_service() -> Arc<CatalogService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        CatalogService::new(sql).unwrap()
    }

    fn hackathon() -> CreateActivityType {
        CreateActivityType {
            name: "Hackathon".into(),
            description: "Participating in a hackathon".into(),
            value: 100,
            supports_multiple_participants: false,
        }
    }

    #[test]
    fn test_activity_type_crud() {
        let svc = test_service();
        let t = svc.create_activity_type(hackathon()).unwrap();
        assert_eq!(t.value, 100);

        let updated = svc
            .update_activity_type(
                &t.id,
                UpdateActivityType { value: Some(150), ..Default::default() },
            )
            .unwrap();
        assert_eq!(updated.value, 150);

        assert_eq!(svc.list_activity_types().unwrap().len(), 1);

        svc.delete_activity_type(&t.id).unwrap();
        assert!(svc.get_activity_type(&t.id).is_err());
    }

    #[test]
    fn test_duplicate_type_name_conflicts() {
        let svc = test_service();
        svc.create_activity_type(hackathon()).unwrap();
        let err = svc.create_activity_type(hackathon()).unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(ref m)
            if m == "Activity type already exists!"));
    }

    #[test]
    fn test_value_must_be_positive() {
        let svc = test_service();
        let mut input = hackathon();
        input.value = 0;
        assert!(matches!(
            svc.create_activity_type(input).unwrap_err(),
            CatalogError::Validation(_)
        ));
    }

    #[test]
    fn disallowed_flow_detection() {
        assert!(is_disallowed_type("Blog"));
        assert!(is_disallowed_type("App"));
        assert!(is_disallowed_type("Open Source Project"));
        assert!(!is_disallowed_type("Happy Hour"));
        assert!(!is_disallowed_type("Hackathon"));
        assert!(!is_disallowed_type("Applications Workshop"));
    }
}
