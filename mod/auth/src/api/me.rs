use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};

use societies_core::{Principal, ServiceError, success};

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn me(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&principal.user_id).map_err(ServiceError::from)?;
    let roles: Vec<&str> = principal.roles.iter().map(|r| r.as_str()).collect();
    Ok(Json(success(
        "Profile fetched successfully.",
        serde_json::json!({"user": user, "roles": roles}),
    )))
}
