use std::sync::Arc;

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use societies_core::ServiceError;

use crate::service::AuthService;

/// Authentication middleware.
///
/// Verifies the bearer token, enriches claims from the staff directory
/// when needed, provisions the user on first sight, and stores the
/// resolved [`Principal`] as a request extension for handlers to
/// extract via `Extension<Principal>`.
///
/// [`Principal`]: societies_core::Principal
pub async fn principal_middleware(
    State(svc): State<Arc<AuthService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()).map(str::to_string) else {
        return ServiceError::Unauthorized(
            "Bad request. Header does not contain an authorization token".into(),
        )
        .into_response();
    };

    let claims = match svc.verify_token(&token) {
        Ok(claims) => claims,
        Err(e) => return ServiceError::from(e).into_response(),
    };
    let claims = match svc.enrich_claims(&token, claims).await {
        Ok(claims) => claims,
        Err(e) => return ServiceError::from(e).into_response(),
    };
    let principal = match svc.resolve_principal(&claims) {
        Ok(principal) => principal,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    req.extensions_mut().insert(principal);
    next.run(req).await
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::*;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer(&headers), None);
    }
}
