use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use societies_core::{Page, PageParams, Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::{CreateSociety, LinkCohort, UpdateSociety};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/societies", get(list_societies).post(create_society))
        .route(
            "/societies/{id}",
            get(get_society).put(update_society).delete(delete_society),
        )
        .route("/societies/{id}/cohorts", post(add_cohort))
}

async fn list_societies(
    State(svc): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) = svc.list_societies(&params).map_err(ServiceError::from)?;
    let page = Page::new(items, total, &params, "/api/v1/societies");
    Ok(Json(success(
        "Societies fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn get_society(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let society = svc.get_society(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Society fetched successfully.",
        serde_json::to_value(society).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn create_society(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateSociety>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let society = svc.create_society(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Society created successfully.",
            serde_json::to_value(society).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}

async fn update_society(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateSociety>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let society = svc.update_society(&id, patch).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Society edited successfully.",
        serde_json::to_value(society).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn delete_society(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    svc.delete_society(&id).map_err(ServiceError::from)?;
    Ok(Json(success("Society deleted successfully.", serde_json::Value::Null)))
}

async fn add_cohort(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<LinkCohort>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    if input.cohort_id.trim().is_empty() {
        return Err(ServiceError::Validation("Cohort id is required".into()));
    }
    svc.add_cohort_to_society(&id, &input.cohort_id)
        .map_err(ServiceError::from)?;

    let society = svc.get_society(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Cohort added to society successfully.",
        serde_json::to_value(society).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}
