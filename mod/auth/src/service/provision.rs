use std::collections::BTreeSet;

use societies_core::{Principal, Role, now_rfc3339};
use societies_sql::Value;

use crate::model::{Claims, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Resolve verified claims into a [`Principal`], provisioning the
    /// user on first sight.
    ///
    /// Runs on every authenticated request, so the happy path for a
    /// known user is a single lookup plus the role query.
    pub fn resolve_principal(&self, claims: &Claims) -> Result<Principal, AuthError> {
        let user = match self.get_user(&claims.sub) {
            Ok(user) => user,
            Err(AuthError::NotFound(_)) => self.provision_user(claims)?,
            Err(e) => return Err(e),
        };
        let user = self.ensure_society_link(user)?;
        let roles = self.user_roles(&user.id)?;

        Ok(Principal {
            user_id: user.id,
            name: user.name,
            email: user.email,
            society_id: user.society_id,
            roles,
        })
    }

    /// Create a user from token claims and grant the recognized roles.
    /// A token with no recognizable role still gets `fellow`.
    fn provision_user(&self, claims: &Claims) -> Result<User, AuthError> {
        let now = now_rfc3339();
        let user = User {
            id: claims.sub.clone(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            photo: claims.picture.clone(),
            society_id: None,
            cohort_id: claims.cohort.clone(),
            center_id: claims.center.clone(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("name", Value::text(&user.name)),
                ("email", Value::text(&user.email)),
                ("cohort_id", Value::opt_text(user.cohort_id.as_deref())),
                ("created_at", Value::text(&now)),
                ("updated_at", Value::text(&now)),
            ],
        )?;

        let mut roles: BTreeSet<Role> =
            claims.roles.iter().filter_map(|r| Role::parse(r)).collect();
        if roles.is_empty() {
            roles.insert(Role::Fellow);
        }
        for role in &roles {
            self.grant_role(&user.id, *role)?;
        }

        Ok(user)
    }

    /// Grant a role to a user. Idempotent.
    pub fn grant_role(&self, user_id: &str, role: Role) -> Result<(), AuthError> {
        self.sql
            .exec(
                "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
                &[Value::text(user_id), Value::text(role.as_str())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Users inherit their society through their cohort. The link is
    /// re-attempted on each request until the cohort is assigned to a
    /// society.
    fn ensure_society_link(&self, mut user: User) -> Result<User, AuthError> {
        if user.society_id.is_some() {
            return Ok(user);
        }
        let Some(cohort_id) = user.cohort_id.clone() else {
            return Ok(user);
        };

        let rows = self
            .sql
            .query(
                "SELECT society_id FROM cohorts WHERE id = ?1",
                &[Value::text(&cohort_id)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        if let Some(society_id) = rows.first().and_then(|r| r.get_str("society_id")) {
            user.society_id = Some(society_id.to_string());
            user.updated_at = now_rfc3339();
            self.update_record(
                "users",
                &user.id.clone(),
                &user,
                &[
                    ("society_id", Value::text(society_id)),
                    ("updated_at", Value::text(&user.updated_at)),
                ],
            )?;
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use societies_sql::sqlite::SqliteStore;

    use super::*;
    use crate::service::AuthConfig;

    fn test_service() -> Arc<AuthService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AuthService::new(sql, AuthConfig::default()).unwrap()
    }

    fn claims(sub: &str, roles: &[&str], cohort: Option<&str>) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: sub.into(),
            name: "Test Fellow".into(),
            email: format!("{sub}@andela.com"),
            picture: None,
            cohort: cohort.map(String::from),
            center: None,
            roles: roles.iter().map(|s| s.to_string()).collect(),
            iat: now,
            exp: now + 3600,
        }
    }

    fn seed_cohort(svc: &AuthService, id: &str, society_id: Option<&str>) {
        svc.sql
            .exec(
                "INSERT INTO cohorts (id, name, center_id, society_id, created_at, updated_at)
                 VALUES (?1, ?2, NULL, ?3, ?4, ?4)",
                &[
                    Value::text(id),
                    Value::text(format!("Cohort {id}")),
                    Value::opt_text(society_id),
                    Value::text(now_rfc3339()),
                ],
            )
            .unwrap();
    }

    #[test]
    fn first_request_provisions_the_user() {
        let svc = test_service();
        let principal = svc
            .resolve_principal(&claims("u1", &["Fellow", "success ops"], None))
            .unwrap();

        assert_eq!(principal.user_id, "u1");
        assert!(principal.has_role(Role::Fellow));
        assert!(principal.has_role(Role::SuccessOps));

        let user = svc.get_user("u1").unwrap();
        assert_eq!(user.email, "u1@andela.com");
    }

    #[test]
    fn unknown_role_names_are_dropped() {
        let svc = test_service();
        let principal = svc
            .resolve_principal(&claims("u1", &["Andelan", "Fellow"], None))
            .unwrap();
        assert_eq!(principal.roles.len(), 1);
        assert!(principal.has_role(Role::Fellow));
    }

    #[test]
    fn no_recognizable_role_defaults_to_fellow() {
        let svc = test_service();
        let principal = svc.resolve_principal(&claims("u1", &["Andelan"], None)).unwrap();
        assert_eq!(principal.roles.len(), 1);
        assert!(principal.has_role(Role::Fellow));
    }

    #[test]
    fn cohort_links_user_to_society() {
        let svc = test_service();
        seed_cohort(&svc, "c1", Some("phoenix"));

        let principal = svc
            .resolve_principal(&claims("u1", &["Fellow"], Some("c1")))
            .unwrap();
        assert_eq!(principal.society_id.as_deref(), Some("phoenix"));
    }

    #[test]
    fn unassigned_cohort_links_later() {
        let svc = test_service();
        seed_cohort(&svc, "c1", None);

        let principal = svc
            .resolve_principal(&claims("u1", &["Fellow"], Some("c1")))
            .unwrap();
        assert!(principal.society_id.is_none());

        // Cohort gets assigned afterwards; the next request picks it up.
        svc.sql
            .exec(
                "UPDATE cohorts SET society_id = ?1 WHERE id = ?2",
                &[Value::text("sparks"), Value::text("c1")],
            )
            .unwrap();

        let principal = svc
            .resolve_principal(&claims("u1", &["Fellow"], Some("c1")))
            .unwrap();
        assert_eq!(principal.society_id.as_deref(), Some("sparks"));
    }

    #[test]
    fn repeat_resolution_is_idempotent() {
        let svc = test_service();
        let c = claims("u1", &["Fellow"], None);
        svc.resolve_principal(&c).unwrap();
        let principal = svc.resolve_principal(&c).unwrap();
        assert_eq!(principal.roles.len(), 1);

        let (_, total) = svc
            .list_records::<User>("users", &[], 10, 0)
            .unwrap();
        assert_eq!(total, 1);
    }
}
