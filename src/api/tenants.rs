use axum::{extract::State, routing::get, Json, Router};

use crate::error::AppResult;
use crate::middleware::{require_owner, AppState, CurrentUser};
use crate::models::User;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_tenants))
}

/// Registered tenants
#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    tag = "tenants",
    responses(
        (status = 200, description = "All tenants", body = Vec<User>),
        (status = 403, description = "Owner only")
    )
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    require_owner(&user)?;
    Ok(Json(state.store.tenants().await))
}
