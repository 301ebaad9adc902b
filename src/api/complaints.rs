use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_owner, require_tenant, AppState, CurrentUser};
use crate::models::{Complaint, RaiseComplaintRequest, UpdateComplaintStatusRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_complaints).post(raise_complaint))
        .route("/:id/status", put(update_status))
        .route("/:id/advance", post(advance_status))
}

fn complaint_not_found() -> AppError {
    AppError::NotFound("Complaint not found".to_string())
}

/// All complaints
#[utoipa::path(
    get,
    path = "/api/v1/complaints",
    tag = "complaints",
    responses(
        (status = 200, description = "All complaints", body = Vec<Complaint>),
        (status = 403, description = "Owner only")
    )
)]
pub async fn list_complaints(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Complaint>>> {
    require_owner(&user)?;
    Ok(Json(state.store.complaints().await))
}

/// Raise a complaint about the tenant's own property
#[utoipa::path(
    post,
    path = "/api/v1/complaints",
    tag = "complaints",
    request_body = RaiseComplaintRequest,
    responses(
        (status = 200, description = "Complaint raised", body = Complaint),
        (status = 400, description = "No property is linked to the tenant"),
        (status = 403, description = "Tenant only, own property only"),
        (status = 422, description = "Invalid complaint")
    )
)]
pub async fn raise_complaint(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<RaiseComplaintRequest>,
) -> AppResult<Json<Complaint>> {
    require_tenant(&user)?;
    payload.validate()?;

    let complaint = state
        .store
        .raise_complaint(Some(&user), payload)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(complaint))
}

/// Set a complaint's status
#[utoipa::path(
    put,
    path = "/api/v1/complaints/{id}/status",
    tag = "complaints",
    params(("id" = String, Path, description = "Complaint ID")),
    request_body = UpdateComplaintStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Complaint),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Complaint not found")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateComplaintStatusRequest>,
) -> AppResult<Json<Complaint>> {
    require_owner(&user)?;
    let complaint = state
        .store
        .update_complaint_status(&id, payload.status)
        .await
        .ok_or_else(complaint_not_found)?;
    Ok(Json(complaint))
}

/// Move a complaint one step forward (OPEN, IN_PROGRESS, RESOLVED)
#[utoipa::path(
    post,
    path = "/api/v1/complaints/{id}/advance",
    tag = "complaints",
    params(("id" = String, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Status advanced", body = Complaint),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Complaint not found")
    )
)]
pub async fn advance_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Complaint>> {
    require_owner(&user)?;
    let complaint = state
        .store
        .advance_complaint(&id)
        .await
        .ok_or_else(complaint_not_found)?;
    Ok(Json(complaint))
}
