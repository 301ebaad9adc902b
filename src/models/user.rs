use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::validators::{validate_aadhaar_number, PHONE_REGEX};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Owner,
    Tenant,
    Broker,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<String>,
}

impl User {
    pub fn is_owner(&self) -> bool {
        self.role == UserRole::Owner
    }

    pub fn is_tenant(&self) -> bool {
        self.role == UserRole::Tenant
    }
}

pub(crate) fn mask_phone(phone: &str) -> String {
    if phone.len() > 8 && phone.is_ascii() {
        format!("{}****{}", &phone[..4], &phone[phone.len() - 4..])
    } else {
        phone.to_string()
    }
}

// DTOs
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTenantRequest {
    #[validate(length(min = 1, max = 120, message = "Tenant name is required"))]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be 10 digits"))]
    pub phone: String,
    #[validate(custom(function = "validate_aadhaar_number", message = "Aadhaar must be 12 digits"))]
    pub aadhaar_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub role: UserRole,
}
