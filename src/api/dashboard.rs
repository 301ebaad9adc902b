use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::{require_owner, require_tenant, AppState, CurrentUser};
use crate::models::{OwnerDashboard, TenantDashboard};

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct DashboardQuery {
    /// Month label such as "October 2023". Defaults to the current month.
    pub month: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/owner", get(owner_dashboard))
        .route("/tenant", get(tenant_dashboard))
}

/// Income, dues, occupancy and complaints at a glance
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/owner",
    tag = "dashboard",
    params(
        ("month" = Option<String>, Query, description = "Month label such as October 2023")
    ),
    responses(
        (status = 200, description = "Owner dashboard", body = OwnerDashboard),
        (status = 403, description = "Owner only")
    )
)]
pub async fn owner_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<OwnerDashboard>> {
    require_owner(&user)?;
    let dashboard = state.store.owner_dashboard(query.month.as_deref()).await;
    Ok(Json(dashboard))
}

/// The tenant's home, dues, history and complaints
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/tenant",
    tag = "dashboard",
    responses(
        (status = 200, description = "Tenant dashboard", body = TenantDashboard),
        (status = 403, description = "Tenant only")
    )
)]
pub async fn tenant_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<TenantDashboard>> {
    require_tenant(&user)?;
    Ok(Json(state.store.tenant_dashboard(&user).await))
}
