use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};

use societies_core::{Page, PageParams, Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::AssignRoles;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/roles", put(assign_roles))
}

async fn list_users(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps, Role::Finance, Role::Cio])?;

    let (items, total) = svc.list_users(&params).map_err(ServiceError::from)?;
    let page = Page::new(items, total, &params, "/api/v1/users");
    Ok(Json(success(
        "Users fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn get_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&id).map_err(ServiceError::from)?;
    let roles: Vec<String> = svc
        .user_roles(&id)
        .map_err(ServiceError::from)?
        .iter()
        .map(|r| r.as_str().to_string())
        .collect();
    Ok(Json(success(
        "User fetched successfully.",
        serde_json::json!({"user": user, "roles": roles}),
    )))
}

async fn assign_roles(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<AssignRoles>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let roles = svc.assign_roles(&id, &input.roles).map_err(ServiceError::from)?;
    let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
    Ok(Json(success(
        "Roles assigned successfully.",
        serde_json::json!({"userId": id, "roles": names}),
    )))
}
