mod activities;
mod activity_types;

use std::sync::Arc;

use axum::Router;

use crate::service::CatalogService;

/// Shared application state.
pub type AppState = Arc<CatalogService>;

/// Build the catalog API router. Routes are relative; the caller nests
/// them under the API prefix.
pub fn build_router(svc: Arc<CatalogService>) -> Router {
    Router::new()
        .merge(activity_types::routes())
        .merge(activities::routes())
        .with_state(svc)
}
