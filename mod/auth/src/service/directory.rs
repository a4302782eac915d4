use serde::Deserialize;
use tracing::debug;

use societies_core::now_rfc3339;
use societies_sql::Value;

use crate::model::Claims;
use crate::service::{AuthError, AuthService};

/// The subset of a staff directory profile the auth service reads.
#[derive(Debug, Deserialize)]
struct DirectoryProfile {
    #[serde(default)]
    cohort: Option<NamedRef>,
    #[serde(default)]
    location: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    id: String,
    name: String,
}

impl AuthService {
    /// Fill missing cohort/center claims from the staff directory.
    ///
    /// No-op when the token already carries a cohort or no directory is
    /// configured. Directory failures surface as `Upstream` so the
    /// client retries instead of being provisioned without a cohort.
    pub async fn enrich_claims(&self, token: &str, mut claims: Claims) -> Result<Claims, AuthError> {
        if claims.cohort.is_some() {
            return Ok(claims);
        }
        let Some(base) = self.config.directory_base_url.as_deref() else {
            return Ok(claims);
        };

        let url = format!("{}/users/{}", base.trim_end_matches('/'), claims.sub);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|_| AuthError::Upstream("Network Error.".into()))?;
        if !response.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "staff directory returned {}",
                response.status()
            )));
        }
        let profile: DirectoryProfile = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        debug!(sub = %claims.sub, "enriched claims from staff directory");

        let now = now_rfc3339();
        if let Some(center) = &profile.location {
            self.sql
                .exec(
                    "INSERT OR IGNORE INTO centers (id, name, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                    &[
                        Value::text(&center.id),
                        Value::text(&center.name),
                        Value::text(&now),
                    ],
                )
                .map_err(|e| AuthError::Storage(e.to_string()))?;
            claims.center = Some(center.id.clone());
        }
        if let Some(cohort) = &profile.cohort {
            self.sql
                .exec(
                    "INSERT OR IGNORE INTO cohorts
                         (id, name, center_id, society_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
                    &[
                        Value::text(&cohort.id),
                        Value::text(&cohort.name),
                        Value::opt_text(claims.center.as_deref()),
                        Value::text(&now),
                    ],
                )
                .map_err(|e| AuthError::Storage(e.to_string()))?;
            claims.cohort = Some(cohort.id.clone());
        }

        Ok(claims)
    }
}
