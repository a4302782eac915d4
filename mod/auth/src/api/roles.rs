use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use societies_core::{Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::CreateRole;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/society-execs", get(society_execs))
        .route("/roles/{id}", get(get_role).delete(delete_role))
}

async fn list_roles(
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let roles = svc.list_roles().map_err(ServiceError::from)?;
    Ok(Json(success(
        "Roles fetched successfully.",
        serde_json::json!({"roles": roles}),
    )))
}

async fn create_role(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateRole>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let role = svc.create_role(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Role created successfully.",
            serde_json::to_value(role).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}

async fn get_role(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let role = svc.get_role(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Role fetched successfully.",
        serde_json::to_value(role).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn delete_role(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    svc.delete_role(&id).map_err(ServiceError::from)?;
    Ok(Json(success("Role deleted successfully.", serde_json::Value::Null)))
}

async fn society_execs(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps, Role::Cio])?;

    let users = svc.society_execs().map_err(ServiceError::from)?;
    Ok(Json(success(
        "Society executives fetched successfully.",
        serde_json::json!({"users": users}),
    )))
}
