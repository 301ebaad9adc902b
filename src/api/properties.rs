use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_owner, require_tenant, AppState, CurrentUser};
use crate::models::{
    AddTenantRequest, CreatePropertyRequest, Payment, Property, PropertyOverview, User,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTenantResponse {
    pub success: bool,
    pub message: String,
    pub tenant: User,
    pub payment: Option<Payment>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentPropertyResponse {
    pub success: bool,
    pub message: String,
    pub property: Property,
    /// Absent when the property was already billed this month.
    pub payment: Option<Payment>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route("/available", get(list_available))
        .route("/:id", get(get_property))
        .route("/:id/tenant", post(add_tenant).delete(remove_tenant))
        .route("/:id/rent", post(rent_property))
        .route("/:id/rent/generate", post(generate_monthly_rent))
}

fn property_not_found() -> AppError {
    AppError::NotFound("Property not found".to_string())
}

/// All properties
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    tag = "properties",
    responses(
        (status = 200, description = "All properties", body = Vec<Property>),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Owner only")
    )
)]
pub async fn list_properties(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Property>>> {
    require_owner(&user)?;
    Ok(Json(state.store.properties().await))
}

/// Add a property
#[utoipa::path(
    post,
    path = "/api/v1/properties",
    tag = "properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 200, description = "Property added, vacant", body = Property),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Owner only"),
        (status = 422, description = "Invalid property data")
    )
)]
pub async fn create_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> AppResult<Json<Property>> {
    payload.validate()?;
    let property = state
        .store
        .add_property(Some(&user), payload)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(property))
}

/// Vacant properties open for renting
#[utoipa::path(
    get,
    path = "/api/v1/properties/available",
    tag = "properties",
    responses(
        (status = 200, description = "Vacant properties", body = Vec<Property>),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_available(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<Property>>> {
    Ok(Json(state.store.available_properties().await))
}

/// Property with its tenant and rent history
#[utoipa::path(
    get,
    path = "/api/v1/properties/{id}",
    tag = "properties",
    params(("id" = String, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property overview", body = PropertyOverview),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<PropertyOverview>> {
    require_owner(&user)?;
    let overview = state
        .store
        .property_overview(&id)
        .await
        .ok_or_else(property_not_found)?;
    Ok(Json(overview))
}

/// Register a tenant and move them into the property
#[utoipa::path(
    post,
    path = "/api/v1/properties/{id}/tenant",
    tag = "properties",
    params(("id" = String, Path, description = "Property ID")),
    request_body = AddTenantRequest,
    responses(
        (status = 200, description = "Tenant added", body = AddTenantResponse),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Property not found"),
        (status = 409, description = "Property already has a tenant"),
        (status = 422, description = "Invalid tenant data")
    )
)]
pub async fn add_tenant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AddTenantRequest>,
) -> AppResult<Json<AddTenantResponse>> {
    require_owner(&user)?;
    payload.validate()?;

    let (tenant, payment) = state
        .store
        .add_tenant(&id, payload)
        .await?
        .ok_or_else(property_not_found)?;

    Ok(Json(AddTenantResponse {
        success: true,
        message: "Tenant added and property marked occupied.".to_string(),
        tenant,
        payment,
    }))
}

/// Vacate the property and drop its tenant
#[utoipa::path(
    delete,
    path = "/api/v1/properties/{id}/tenant",
    tag = "properties",
    params(("id" = String, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Tenant removed"),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Property not found or vacant")
    )
)]
pub async fn remove_tenant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    require_owner(&user)?;
    let tenant_id = state
        .store
        .remove_tenant(&id)
        .await
        .ok_or_else(|| AppError::NotFound("Property has no tenant".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Tenant removed. Property is now vacant.",
        "tenantId": tenant_id
    })))
}

/// Rent a vacant property as the logged-in tenant
#[utoipa::path(
    post,
    path = "/api/v1/properties/{id}/rent",
    tag = "properties",
    params(("id" = String, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property rented", body = RentPropertyResponse),
        (status = 403, description = "Tenant only"),
        (status = 404, description = "Property not found"),
        (status = 409, description = "Already renting, or property taken")
    )
)]
pub async fn rent_property(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<RentPropertyResponse>> {
    require_tenant(&user)?;
    let (property, payment) = state
        .store
        .rent_property(Some(&user), &id)
        .await?
        .ok_or_else(property_not_found)?;

    Ok(Json(RentPropertyResponse {
        success: true,
        message: "Property rented successfully!".to_string(),
        property,
        payment,
    }))
}

/// Bill the tenant for the current month
#[utoipa::path(
    post,
    path = "/api/v1/properties/{id}/rent/generate",
    tag = "properties",
    params(("id" = String, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Rent generated", body = Payment),
        (status = 400, description = "Property has no tenant assigned"),
        (status = 403, description = "Owner only"),
        (status = 409, description = "Payment for this month already exists")
    )
)]
pub async fn generate_monthly_rent(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Payment>> {
    require_owner(&user)?;
    let payment = state.store.generate_monthly_rent(&id).await?;
    Ok(Json(payment))
}
