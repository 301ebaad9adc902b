use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum PropertyType {
    #[serde(rename = "1 BHK")]
    Bhk1,
    #[serde(rename = "2 BHK")]
    Bhk2,
    #[serde(rename = "3 BHK")]
    Bhk3,
    #[serde(rename = "Single Room")]
    Room,
    #[serde(rename = "Flat")]
    Flat,
    #[serde(rename = "Independent House")]
    House,
}

impl Default for PropertyType {
    fn default() -> Self {
        Self::Flat
    }
}

/// A rentable unit. `tenant_id` is set exactly when `is_occupied` is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub rent_amount: u64,
    pub due_day: u8,
    pub is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Property {
    /// Tenant currently living here, if any.
    pub fn occupant(&self) -> Option<&str> {
        if self.is_occupied {
            self.tenant_id.as_deref()
        } else {
            None
        }
    }

    pub fn is_occupied_by(&self, tenant_id: &str) -> bool {
        self.occupant() == Some(tenant_id)
    }

    pub(crate) fn occupy(&mut self, tenant_id: &str) {
        self.is_occupied = true;
        self.tenant_id = Some(tenant_id.to_string());
    }

    pub(crate) fn vacate(&mut self) {
        self.is_occupied = false;
        self.tenant_id = None;
    }
}

// DTOs
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200, message = "Property name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,
    #[validate(range(min = 1, message = "Rent must be a positive amount"))]
    pub rent_amount: u64,
    #[validate(range(min = 1, max = 31, message = "Due day must be between 1 and 31"))]
    pub due_day: u8,
    pub images: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> Property {
        Property {
            id: "prop-1".into(),
            name: "Flat 302".into(),
            address: "Sector 45".into(),
            city: "Gurgaon".into(),
            property_type: PropertyType::Flat,
            rent_amount: 15000,
            due_day: 5,
            is_occupied: false,
            tenant_id: None,
            images: None,
        }
    }

    #[test]
    fn property_type_keeps_display_labels() {
        assert_eq!(
            serde_json::to_string(&PropertyType::Bhk2).unwrap(),
            "\"2 BHK\""
        );
        assert_eq!(
            serde_json::from_str::<PropertyType>("\"Independent House\"").unwrap(),
            PropertyType::House
        );
    }

    #[test]
    fn occupancy_helpers_keep_flag_and_tenant_together() {
        let mut p = flat();
        assert_eq!(p.occupant(), None);

        p.occupy("tenant-7");
        assert!(p.is_occupied);
        assert!(p.is_occupied_by("tenant-7"));

        p.vacate();
        assert!(!p.is_occupied);
        assert_eq!(p.tenant_id, None);
    }

    #[test]
    fn stale_tenant_id_on_vacant_property_is_not_an_occupant() {
        let mut p = flat();
        p.tenant_id = Some("ghost".into());
        assert_eq!(p.occupant(), None);
    }

    #[test]
    fn serializes_camel_case_fields() {
        let value = serde_json::to_value(flat()).unwrap();
        assert_eq!(value["rentAmount"], 15000);
        assert_eq!(value["dueDay"], 5);
        assert_eq!(value["isOccupied"], false);
        assert_eq!(value["type"], "Flat");
        assert!(value.get("tenantId").is_none());
    }

    #[test]
    fn create_request_rejects_bad_due_day() {
        let req: CreatePropertyRequest = serde_json::from_value(serde_json::json!({
            "name": "Flat 302",
            "address": "Sector 45",
            "city": "Gurgaon",
            "rentAmount": 15000,
            "dueDay": 32
        }))
        .unwrap();
        assert_eq!(req.property_type, PropertyType::Flat);
        assert!(req.validate().is_err());
    }
}
