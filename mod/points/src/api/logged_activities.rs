use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};

use societies_core::{Page, PageParams, Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::{BulkApproveInput, InfoRequestInput, LogActivityInput, ReviewInput};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logged-activities", get(list_activities).post(log_activity))
        .route(
            "/logged-activities/{id}",
            get(get_activity).put(edit_activity).delete(delete_activity),
        )
        .route("/logged-activities/review/{id}", put(review_activity))
        .route("/logged-activities/approve", put(bulk_approve))
        .route("/logged-activities/reject/{id}", put(reject_activity))
        .route("/logged-activities/info/{id}", put(request_info))
        .route("/users/{id}/logged-activities", get(list_user_activities))
        .route("/societies/{id}/logged-activities", get(list_society_activities))
}

async fn list_activities(
    State(svc): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) = svc.list_logged_activities(&params).map_err(ServiceError::from)?;
    let page = Page::new(items, total, &params, "/api/v1/logged-activities");
    Ok(Json(success(
        "Logged activities fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn list_user_activities(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) = svc.list_user_activities(&id, &params).map_err(ServiceError::from)?;
    let page = Page::new(items, total, &params, &format!("/api/v1/users/{id}/logged-activities"));
    Ok(Json(success(
        "Logged activities fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn list_society_activities(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) =
        svc.list_society_activities(&id, &params).map_err(ServiceError::from)?;
    let page = Page::new(
        items,
        total,
        &params,
        &format!("/api/v1/societies/{id}/logged-activities"),
    );
    Ok(Json(success(
        "Logged activities fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn get_activity(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let record = svc.get_logged_activity(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Logged activity fetched successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn log_activity(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<LogActivityInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let record = svc.log_activity(&principal, &input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Activity logged successfully.",
            serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}

async fn edit_activity(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<LogActivityInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let record = svc
        .edit_logged_activity(&principal, &id, &input)
        .map_err(ServiceError::from)?;
    Ok(Json(success(
        "Logged activity edited successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn delete_activity(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_logged_activity(&principal, &id)
        .map_err(ServiceError::from)?;
    Ok(Json(success("Logged activity deleted successfully.", serde_json::Value::Null)))
}

async fn review_activity(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SocietySecretary])?;

    let record = svc
        .review_activity(&principal, &id, &input.status)
        .map_err(ServiceError::from)?;
    Ok(Json(success(
        "Logged activity reviewed successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn bulk_approve(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<BulkApproveInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let approved = svc.bulk_approve(&principal, &input).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Logged activities approved successfully.",
        serde_json::to_value(approved).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn reject_activity(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let record = svc.reject_activity(&principal, &id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Logged activity rejected successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn request_info(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<InfoRequestInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    svc.request_info(&principal, &id, &input.comment)
        .map_err(ServiceError::from)?;
    Ok(Json(success("Comment sent successfully.", serde_json::Value::Null)))
}
