use chrono::NaiveDate;

use societies_core::{PageParams, new_id, now_rfc3339, today};
use societies_sql::Value;

use tracing::info;

use crate::model::{Activity, CreateActivity};
use crate::service::activity_type::{DISALLOWED_TYPES, contains_phrase, is_disallowed_type};
use crate::service::{CatalogError, CatalogService};

impl CatalogService {
    /// Create an activity occurrence.
    ///
    /// Refused when the name is taken, the type is missing or belongs
    /// to a disallowed flow, the name itself references a disallowed
    /// flow, or the date lies in the past.
    pub fn create_activity(
        &self,
        added_by: &str,
        input: CreateActivity,
    ) -> Result<Activity, CatalogError> {
        let name = input.name.trim();
        if name.is_empty()
            || input.description.trim().is_empty()
            || input.activity_type_id.trim().is_empty()
            || input.date.trim().is_empty()
        {
            return Err(CatalogError::Validation("This is not a valid activity!".into()));
        }
        if DISALLOWED_TYPES.iter().any(|t| contains_phrase(name, t)) {
            return Err(CatalogError::Validation("This is not a valid activity!".into()));
        }

        let activity_type = match self.get_activity_type(&input.activity_type_id) {
            Ok(t) => t,
            Err(CatalogError::NotFound(_)) => {
                return Err(CatalogError::NotFound(
                    "Activity type does not exist or is unsupported.".into(),
                ));
            }
            Err(e) => return Err(e),
        };
        if is_disallowed_type(&activity_type.name) {
            return Err(CatalogError::NotFound(
                "Activity type does not exist or is unsupported.".into(),
            ));
        }

        let date = NaiveDate::parse_from_str(input.date.trim(), "%Y-%m-%d")
            .map_err(|_| CatalogError::Validation("This is not a valid activity!".into()))?;
        if date < today() {
            return Err(CatalogError::Unprocessable(
                "The activity date must not be in the past.".into(),
            ));
        }

        let existing = self
            .sql
            .query(
                "SELECT id FROM activities WHERE name = ?1 COLLATE NOCASE",
                &[Value::text(name)],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if !existing.is_empty() {
            return Err(CatalogError::Conflict("Activity already exists!".into()));
        }

        let now = now_rfc3339();
        let activity = Activity {
            id: new_id(),
            name: name.to_string(),
            description: input.description.trim().to_string(),
            activity_type_id: activity_type.id,
            activity_date: date.format("%Y-%m-%d").to_string(),
            added_by: added_by.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "activities",
            &activity.id,
            &activity,
            &[
                ("name", Value::text(&activity.name)),
                ("activity_type_id", Value::text(&activity.activity_type_id)),
                ("activity_date", Value::text(&activity.activity_date)),
                ("created_at", Value::text(&now)),
                ("updated_at", Value::text(&now)),
            ],
        )?;
        info!(id = %activity.id, name = %activity.name, added_by = %activity.added_by,
              "activity occurrence created");
        Ok(activity)
    }

    /// Get an activity occurrence by id.
    pub fn get_activity(&self, id: &str) -> Result<Activity, CatalogError> {
        self.get_record("activities", id)
    }

    /// List activity occurrences, newest first.
    pub fn list_activities(
        &self,
        params: &PageParams,
    ) -> Result<(Vec<Activity>, usize), CatalogError> {
        let params = params.normalized();
        self.list_records("activities", &[], params.limit, params.offset())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use societies_sql::sqlite::SqliteStore;

    use super::*;
    use crate::model::CreateActivityType;

    fn test_service() -> Arc<CatalogService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        CatalogService::new(sql).unwrap()
    }

    fn seed_type(svc: &CatalogService, name: &str, value: i64) -> String {
        svc.create_activity_type(CreateActivityType {
            name: name.into(),
            description: format!("{name} activities"),
            value,
            supports_multiple_participants: false,
        })
        .unwrap()
        .id
    }

    fn tomorrow() -> String {
        (today() + chrono::Duration::days(1)).format("%Y-%m-%d").to_string()
    }

    fn create(name: &str, type_id: &str, date: &str) -> CreateActivity {
        CreateActivity {
            name: name.into(),
            description: "An upcoming event".into(),
            activity_type_id: type_id.into(),
            date: date.into(),
        }
    }

    #[test]
    fn test_create_activity() {
        let svc = test_service();
        let type_id = seed_type(&svc, "Tech Event", 2500);

        let activity = svc
            .create_activity("u1", create("Tech Congress", &type_id, &tomorrow()))
            .unwrap();
        assert_eq!(activity.name, "Tech Congress");
        assert_eq!(activity.added_by, "u1");

        let fetched = svc.get_activity(&activity.id).unwrap();
        assert_eq!(fetched.activity_type_id, type_id);
    }

    #[test]
    fn test_duplicate_name_conflicts_case_insensitively() {
        let svc = test_service();
        let type_id = seed_type(&svc, "Tech Event", 2500);
        svc.create_activity("u1", create("Tech Congress", &type_id, &tomorrow()))
            .unwrap();

        let err = svc
            .create_activity("u1", create("tech congress", &type_id, &tomorrow()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(ref m) if m == "Activity already exists!"));
    }

    #[test]
    fn test_unknown_or_disallowed_type_is_404() {
        let svc = test_service();
        let err = svc
            .create_activity("u1", create("Tech Congress", "missing", &tomorrow()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(ref m)
            if m == "Activity type does not exist or is unsupported."));

        let blog_id = seed_type(&svc, "Blog", 1000);
        let err = svc
            .create_activity("u1", create("Writing sprint", &blog_id, &tomorrow()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_disallowed_name_is_invalid() {
        let svc = test_service();
        let type_id = seed_type(&svc, "Tech Event", 2500);
        let err = svc
            .create_activity("u1", create("Blog bonanza", &type_id, &tomorrow()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref m)
            if m == "This is not a valid activity!"));
    }

    #[test]
    fn test_past_date_is_unprocessable() {
        let svc = test_service();
        let type_id = seed_type(&svc, "Tech Event", 2500);
        let yesterday = (today() - chrono::Duration::days(1)).format("%Y-%m-%d").to_string();

        let err = svc
            .create_activity("u1", create("Tech Congress", &type_id, &yesterday))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unprocessable(_)));

        // Today is fine.
        let today_s = today().format("%Y-%m-%d").to_string();
        assert!(svc.create_activity("u1", create("Tech Congress", &type_id, &today_s)).is_ok());
    }

    #[test]
    fn test_missing_fields_are_invalid() {
        let svc = test_service();
        let type_id = seed_type(&svc, "Tech Event", 2500);
        let err = svc.create_activity("u1", create("", &type_id, &tomorrow())).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let err = svc
            .create_activity("u1", create("Tech Congress", &type_id, "12/01/2026"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
