use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Due,
    Partial,
    Overdue,
    Paid,
}

impl PaymentStatus {
    /// Counted as outstanding on the owner dashboard.
    pub fn is_pending(self) -> bool {
        match self {
            Self::Due | Self::Overdue => true,
            Self::Partial | Self::Paid => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Rent,
    Electricity,
    Water,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub amount: u64,
    /// Long month name plus year, e.g. "October 2023".
    pub month: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_paid: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_sent: Option<bool>,
}

impl Payment {
    pub fn is_rent_for(&self, property_id: &str, month: &str) -> bool {
        self.payment_type == PaymentType::Rent
            && self.property_id == property_id
            && self.month == month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_due_and_overdue_are_pending() {
        assert!(PaymentStatus::Due.is_pending());
        assert!(PaymentStatus::Overdue.is_pending());
        assert!(!PaymentStatus::Partial.is_pending());
        assert!(!PaymentStatus::Paid.is_pending());
    }

    #[test]
    fn reads_stored_record_shape() {
        let payment: Payment = serde_json::from_value(serde_json::json!({
            "id": "pay-1",
            "propertyId": "prop-1",
            "tenantId": "tenant-1",
            "amount": 15000,
            "month": "October 2023",
            "status": "PAID",
            "datePaid": "2023-10-04",
            "type": "RENT"
        }))
        .unwrap();

        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.date_paid, NaiveDate::from_ymd_opt(2023, 10, 4));
        assert_eq!(payment.reminder_sent, None);
        assert!(payment.is_rent_for("prop-1", "October 2023"));
        assert!(!payment.is_rent_for("prop-1", "November 2023"));
    }
}
