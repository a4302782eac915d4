use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use societies_core::{Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::{CreateCenter, CreateCohort};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cohorts", get(list_cohorts).post(create_cohort))
        .route("/centers", get(list_centers).post(create_center))
}

#[derive(Debug, Default, Deserialize)]
struct CohortFilters {
    /// Society id to scope the listing to.
    #[serde(default)]
    society: Option<String>,
}

async fn list_cohorts(
    State(svc): State<AppState>,
    Query(filters): Query<CohortFilters>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let cohorts = svc
        .list_cohorts(filters.society.as_deref())
        .map_err(ServiceError::from)?;
    Ok(Json(success(
        "Cohorts fetched successfully.",
        serde_json::to_value(cohorts).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn create_cohort(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateCohort>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let cohort = svc.create_cohort(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Cohort created successfully.",
            serde_json::to_value(cohort).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}

async fn list_centers(
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let centers = svc.list_centers().map_err(ServiceError::from)?;
    Ok(Json(success(
        "Centers fetched successfully.",
        serde_json::to_value(centers).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn create_center(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateCenter>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SuccessOps])?;

    let center = svc.create_center(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Center created successfully.",
            serde_json::to_value(center).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}
