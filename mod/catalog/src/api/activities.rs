use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use societies_core::{Page, PageParams, Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::CreateActivity;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(list_activities).post(create_activity))
        .route("/activities/{id}", get(get_activity))
}

async fn list_activities(
    State(svc): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) = svc.list_activities(&params).map_err(ServiceError::from)?;
    let page = Page::new(items, total, &params, "/api/v1/activities");
    Ok(Json(success(
        "Activities fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn get_activity(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let activity = svc.get_activity(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Activity fetched successfully.",
        serde_json::to_value(activity).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn create_activity(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateActivity>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let activity = svc
        .create_activity(&principal.user_id, input)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Activity created successfully.",
            serde_json::to_value(activity).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}
