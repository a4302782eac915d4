use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use societies_core::{Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::{CreateActivityType, UpdateActivityType};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activity-types", get(list_types).post(create_type))
        .route(
            "/activity-types/{id}",
            get(get_type).put(update_type).delete(delete_type),
        )
}

async fn list_types(
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let types = svc.list_activity_types().map_err(ServiceError::from)?;
    Ok(Json(success(
        "Activity types fetched successfully.",
        serde_json::json!({"activityTypes": types}),
    )))
}

async fn get_type(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let activity_type = svc.get_activity_type(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Activity type fetched successfully.",
        serde_json::to_value(activity_type).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn create_type(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateActivityType>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let activity_type = svc.create_activity_type(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Activity type created successfully.",
            serde_json::to_value(activity_type)
                .map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}

async fn update_type(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateActivityType>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let activity_type = svc.update_activity_type(&id, patch).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Activity type updated successfully.",
        serde_json::to_value(activity_type).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn delete_type(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    svc.delete_activity_type(&id).map_err(ServiceError::from)?;
    Ok(Json(success("Activity type deleted successfully.", serde_json::Value::Null)))
}
