mod cohorts;
mod logged_activities;
mod redemptions;
mod societies;

use std::sync::Arc;

use axum::Router;

use crate::service::PointsService;

/// Shared application state.
pub type AppState = Arc<PointsService>;

/// Build the points API router. Routes are relative; the caller nests
/// them under the API prefix. Static segments such as
/// `/societies/redeem` take precedence over `/societies/{id}`.
pub fn build_router(svc: Arc<PointsService>) -> Router {
    Router::new()
        .merge(societies::routes())
        .merge(logged_activities::routes())
        .merge(redemptions::routes())
        .merge(cohorts::routes())
        .with_state(svc)
}
