use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::model::Claims;
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Verify and decode a bearer token.
    ///
    /// Expired tokens get a distinct message so clients know to
    /// re-authenticate rather than retry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                AuthError::Unauthorized("The authorization token supplied is expired".into())
            }
            _ => AuthError::Unauthorized("The authorization token supplied is invalid".into()),
        })?;

        Ok(token_data.claims)
    }

    /// Sign a token for the given claims. Used by tests and the
    /// bootstrap tooling; production tokens come from the identity
    /// provider with the same secret.
    pub fn issue_token(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))
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

    fn claims(exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: "u1".into(),
            name: "Test Fellow".into(),
            email: "fellow@andela.com".into(),
            picture: None,
            cohort: None,
            center: None,
            roles: vec!["Fellow".into()],
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = test_service();
        let token = svc.issue_token(&claims(3600)).unwrap();
        let decoded = svc.verify_token(&token).unwrap();
        assert_eq!(decoded.sub, "u1");
        assert_eq!(decoded.roles, vec!["Fellow"]);
    }

    #[test]
    fn test_expired_token() {
        let svc = test_service();
        let token = svc.issue_token(&claims(-3600)).unwrap();
        let err = svc.verify_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(ref m)
            if m == "The authorization token supplied is expired"));
    }

    #[test]
    fn test_garbage_token() {
        let svc = test_service();
        let err = svc.verify_token("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(ref m)
            if m == "The authorization token supplied is invalid"));
    }

    #[test]
    fn test_wrong_secret() {
        let svc = test_service();
        let token = svc.issue_token(&claims(3600)).unwrap();

        let other = AuthService::new(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            AuthConfig {
                jwt_secret: "a-different-secret".into(),
                directory_base_url: None,
            },
        )
        .unwrap();
        assert!(other.verify_token(&token).is_err());
    }
}
