use serde::Serialize;
use utoipa::ToSchema;

use super::{Complaint, Payment, Property, User};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentView {
    pub payment: Payment,
    pub property_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub month: String,
    pub total_income: u64,
    pub pending_amount: u64,
    pub pending_count: usize,
    pub occupied_count: usize,
    pub total_properties: usize,
    pub occupancy_rate: u32,
    pub pending_payments: Vec<PendingPaymentView>,
    pub complaints: Vec<Complaint>,
}

/// A property together with its occupant and rent history.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOverview {
    pub property: Property,
    pub tenant: Option<User>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantDashboard {
    pub my_property: Option<Property>,
    pub current_due: Option<Payment>,
    pub payments: Vec<Payment>,
    pub complaints: Vec<Complaint>,
    pub available_properties: Vec<Property>,
}
