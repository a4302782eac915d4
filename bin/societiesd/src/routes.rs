//! Route registration: system endpoints plus the authenticated API.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use auth::api::middleware::principal_middleware;
use auth::service::AuthService;

/// Build the complete router. Module routers are merged under
/// `/api/v1` behind the authentication middleware; `/health` and
/// `/version` stay public.
pub fn build_router(auth_svc: Arc<AuthService>, module_routes: Vec<Router>) -> Router {
    let mut api = Router::new();
    for router in module_routes {
        api = api.merge(router);
    }
    let api = api.layer(middleware::from_fn_with_state(auth_svc, principal_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api/v1", api)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "societiesd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
