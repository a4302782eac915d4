mod me;
mod roles;
mod users;
pub mod middleware;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth API router.
///
/// All routes are relative — the caller nests them under the API
/// prefix and layers [`middleware::principal_middleware`] over the
/// whole authenticated surface.
pub fn build_router(svc: Arc<AuthService>) -> Router {
    Router::new()
        .merge(me::routes())
        .merge(users::routes())
        .merge(roles::routes())
        .with_state(svc)
}
