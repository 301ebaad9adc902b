use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_owner, AppState, CurrentUser};
use crate::models::Payment;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub success: bool,
    pub message: String,
    pub payment: Payment,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments))
        .route("/:id/pay", post(pay_rent))
        .route("/:id/reminder", post(send_reminder))
}

fn payment_not_found() -> AppError {
    AppError::NotFound("Payment not found".to_string())
}

/// All payments across properties
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "payments",
    responses(
        (status = 200, description = "All payments", body = Vec<Payment>),
        (status = 403, description = "Owner only")
    )
)]
pub async fn list_payments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Payment>>> {
    require_owner(&user)?;
    Ok(Json(state.store.payments().await))
}

/// Mark a payment as paid
///
/// Owners may settle any payment, tenants only their own.
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/pay",
    tag = "payments",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment is paid", body = Payment),
        (status = 403, description = "Payment belongs to another tenant"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn pay_rent(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Payment>> {
    if !user.is_owner() {
        let payment = state.store.payment(&id).await.ok_or_else(payment_not_found)?;
        if payment.tenant_id != user.id {
            return Err(AppError::Forbidden);
        }
    }

    let payment = state.store.pay_rent(&id).await.ok_or_else(payment_not_found)?;
    Ok(Json(payment))
}

/// Flag a reminder as sent and text the tenant
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/reminder",
    tag = "payments",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Reminder sent", body = ReminderResponse),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn send_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ReminderResponse>> {
    require_owner(&user)?;
    let payment = state
        .store
        .send_reminder(&id)
        .await
        .ok_or_else(payment_not_found)?;

    let data = state.store.snapshot().await;
    match data.tenant(&payment.tenant_id) {
        Some(tenant) => {
            let property = data.property(&payment.property_id);
            // Delivery failure leaves the flag set
            if let Err(e) = state.sms.send_rent_reminder(tenant, property, &payment).await {
                tracing::error!("Failed to deliver reminder for {}: {}", payment.id, e);
            }
        }
        None => tracing::warn!(
            "Reminder for {} has no known tenant {}",
            payment.id,
            payment.tenant_id
        ),
    }

    Ok(Json(ReminderResponse {
        success: true,
        message: format!("Reminder sent for {}.", payment.month),
        payment,
    }))
}
