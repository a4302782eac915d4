use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};

use societies_core::{Page, PageParams, Principal, Role, ServiceError, success};

use crate::api::AppState;
use crate::model::{
    CompleteRedemptionInput, CreateRedemption, RedemptionFilters, UpdateRedemption,
    VerifyRedemptionInput,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/societies/redeem", get(list_redemptions).post(create_redemption))
        .route("/societies/redeem/verify/{id}", put(verify_redemption))
        .route("/societies/redeem/funds/{id}", put(complete_redemption))
        .route(
            "/societies/redeem/{id}",
            get(get_redemption).put(edit_redemption).delete(delete_redemption),
        )
}

async fn list_redemptions(
    State(svc): State<AppState>,
    Query(filters): Query<RedemptionFilters>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) = svc
        .list_redemptions(&filters, &params)
        .map_err(ServiceError::from)?;
    let page = Page::new(items, total, &params, "/api/v1/societies/redeem");
    Ok(Json(success(
        "Redemption requests fetched successfully.",
        serde_json::to_value(page).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn get_redemption(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let record = svc.get_redemption(&id).map_err(ServiceError::from)?;
    Ok(Json(success(
        "Redemption request fetched successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn create_redemption(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateRedemption>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    principal.require_any(&[Role::SocietyPresident])?;

    let record = svc
        .create_redemption(&principal, &input)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(success(
            "Redemption request created successfully.",
            serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
        )),
    ))
}

async fn verify_redemption(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<VerifyRedemptionInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SuccessOps, Role::Cio])?;

    let record = svc
        .verify_redemption(&principal, &id, &input)
        .map_err(ServiceError::from)?;
    Ok(Json(success(
        "Redemption request verified successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn complete_redemption(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<CompleteRedemptionInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::Finance])?;

    let record = svc
        .complete_redemption(&principal, &id, &input.status)
        .map_err(ServiceError::from)?;
    Ok(Json(success(
        "Redemption request completed successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn edit_redemption(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateRedemption>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SocietyPresident])?;

    let record = svc
        .edit_redemption(&principal, &id, &patch)
        .map_err(ServiceError::from)?;
    Ok(Json(success(
        "Redemption request edited successfully.",
        serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?,
    )))
}

async fn delete_redemption(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    principal.require_any(&[Role::SocietyPresident])?;

    svc.delete_redemption(&principal, &id)
        .map_err(ServiceError::from)?;
    Ok(Json(success("Redemption request deleted successfully.", serde_json::Value::Null)))
}
