use std::sync::Arc;

use auth::model::Claims;
use auth::service::{AuthConfig, AuthService};
use catalog::model::CreateActivityType;
use catalog::service::CatalogService;
use societies_core::{Principal, Role, new_id, now_rfc3339};
use societies_notify::RecordingNotifier;
use societies_sql::sqlite::SqliteStore;
use societies_sql::{SQLStore, Value};

use crate::service::PointsService;

/// All services wired over one in-memory database, with a recording
/// notifier for side-effect assertions.
pub(crate) struct Harness {
    pub sql: Arc<dyn SQLStore>,
    pub auth: Arc<AuthService>,
    pub catalog: Arc<CatalogService>,
    pub points: Arc<PointsService>,
    pub notifier: Arc<RecordingNotifier>,
}

pub(crate) fn harness() -> Harness {
    let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let auth = AuthService::new(sql.clone(), AuthConfig::default()).unwrap();
    let catalog = CatalogService::new(sql.clone()).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let points =
        PointsService::new(sql.clone(), catalog.clone(), auth.clone(), notifier.clone()).unwrap();
    Harness { sql, auth, catalog, points, notifier }
}

impl Harness {
    /// Provision a user through auth (so email lookups resolve) and
    /// return a principal with the given society and roles.
    pub fn principal(&self, sub: &str, society_id: Option<&str>, roles: &[Role]) -> Principal {
        let now = chrono::Utc::now().timestamp();
        self.auth
            .resolve_principal(&Claims {
                sub: sub.into(),
                name: format!("User {sub}"),
                email: format!("{sub}@andela.com"),
                picture: None,
                cohort: None,
                center: None,
                roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
                iat: now,
                exp: now + 3600,
            })
            .unwrap();

        Principal {
            user_id: sub.into(),
            name: format!("User {sub}"),
            email: format!("{sub}@andela.com"),
            society_id: society_id.map(String::from),
            roles: roles.iter().copied().collect(),
        }
    }

    pub fn seed_cohort(&self, name: &str, society_id: Option<&str>) -> String {
        let id = new_id();
        self.sql
            .exec(
                "INSERT INTO cohorts (id, name, center_id, society_id, created_at, updated_at)
                 VALUES (?1, ?2, NULL, ?3, ?4, ?4)",
                &[
                    Value::text(&id),
                    Value::text(name),
                    Value::opt_text(society_id),
                    Value::text(now_rfc3339()),
                ],
            )
            .unwrap();
        id
    }

    pub fn seed_center(&self, name: &str) -> String {
        let id = new_id();
        self.sql
            .exec(
                "INSERT INTO centers (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                &[Value::text(&id), Value::text(name), Value::text(now_rfc3339())],
            )
            .unwrap();
        id
    }

    pub fn seed_type(&self, name: &str, value: i64, multi: bool) -> String {
        self.catalog
            .create_activity_type(CreateActivityType {
                name: name.into(),
                description: format!("{name} activities"),
                value,
                supports_multiple_participants: multi,
            })
            .unwrap()
            .id
    }

    /// Insert an activity occurrence directly, bypassing the no-past-
    /// dates rule of the catalog API. Logging tests need occurrences
    /// whose date is already behind today.
    pub fn seed_occurrence(&self, name: &str, type_id: &str, date: &str) -> String {
        let now = now_rfc3339();
        let activity = catalog::model::Activity {
            id: new_id(),
            name: name.into(),
            description: format!("{name} occurrence"),
            activity_type_id: type_id.into(),
            activity_date: date.into(),
            added_by: "ops".into(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        self.sql
            .exec(
                "INSERT INTO activities
                     (id, name, activity_type_id, activity_date, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                &[
                    Value::text(&activity.id),
                    Value::text(&activity.name),
                    Value::text(type_id),
                    Value::text(date),
                    Value::Text(serde_json::to_string(&activity).unwrap()),
                    Value::text(&now),
                ],
            )
            .unwrap();
        activity.id
    }

    /// Date string `days` days before today, `YYYY-MM-DD`.
    pub fn days_ago(&self, days: i64) -> String {
        (societies_core::today() - chrono::Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }
}
