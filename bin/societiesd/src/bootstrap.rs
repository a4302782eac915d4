//! First-start checks and idempotent reference-data seeding.

use auth::service::AuthService;
use catalog::service::CatalogService;
use societies_core::Role;
use tracing::info;

use crate::config::ServerConfig;

/// The standard activity-type catalog: name, description, value, and
/// whether the value multiplies by participant count.
const ACTIVITY_TYPES: &[(&str, &str, i64, bool)] = &[
    ("Bootcamp Interviews", "Interviewing candidates during a bootcamp", 20, true),
    ("Open Saturdays Guides", "Guiding prospects during Open Saturdays", 50, false),
    ("Tech Event", "Organizing a technology event", 2500, false),
    ("Open Source Project", "Starting an open source project", 2500, false),
    ("Hackathon", "Participating in a hackathon", 100, false),
    ("Blog", "Writing a blog post", 1000, false),
    ("App", "Releasing an application", 10000, false),
    ("Mentoring", "Mentoring a fellow", 250, false),
    ("Marketing", "Marketing an Andela event", 2000, false),
    ("Press Interview", "Giving a press interview", 3000, false),
    ("External Mentoring", "Mentoring outside Andela", 250, false),
];

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Ensure the built-in role set and the standard activity-type catalog
/// exist. Safe to run on every start.
pub fn seed(auth: &AuthService, catalog: &CatalogService) -> anyhow::Result<()> {
    for role in Role::all() {
        auth.ensure_role(role.as_str())
            .map_err(|e| anyhow::anyhow!("failed to seed role {}: {}", role.as_str(), e))?;
    }
    for (name, description, value, multi) in ACTIVITY_TYPES {
        catalog
            .ensure_activity_type(name, description, *value, *multi)
            .map_err(|e| anyhow::anyhow!("failed to seed activity type {}: {}", name, e))?;
    }
    info!(
        roles = Role::all().len(),
        activity_types = ACTIVITY_TYPES.len(),
        "reference data seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use auth::service::AuthConfig;
    use societies_sql::sqlite::SqliteStore;

    use super::*;
    use crate::config::{JwtConfig, ServerConfig, StorageConfig};

    fn test_config(secret: &str, data_dir: &str) -> ServerConfig {
        ServerConfig {
            server: Default::default(),
            storage: StorageConfig { data_dir: data_dir.into() },
            jwt: JwtConfig { secret: secret.into() },
            notify: Default::default(),
            directory: Default::default(),
        }
    }

    #[test]
    fn test_verify_config() {
        assert!(verify_config(&test_config("s3cret", "/tmp")).is_ok());
        assert!(verify_config(&test_config("", "/tmp")).is_err());
        assert!(verify_config(&test_config("s3cret", "")).is_err());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let auth = AuthService::new(sql.clone(), AuthConfig::default()).unwrap();
        let catalog = CatalogService::new(sql).unwrap();

        seed(&auth, &catalog).unwrap();
        seed(&auth, &catalog).unwrap();

        assert_eq!(auth.list_roles().unwrap().len(), Role::all().len());
        let types = catalog.list_activity_types().unwrap();
        assert_eq!(types.len(), ACTIVITY_TYPES.len());

        let interviews = types.iter().find(|t| t.name == "Bootcamp Interviews").unwrap();
        assert_eq!(interviews.value, 20);
        assert!(interviews.supports_multiple_participants);
    }
}
