use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    /// The step the owner's one-click action moves a complaint to.
    pub fn next(self) -> Self {
        match self {
            Self::Open => Self::InProgress,
            Self::InProgress | Self::Resolved => Self::Resolved,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub tenant_id: String,
    pub property_id: String,
    pub title: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

// DTOs
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaiseComplaintRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: String,
    /// Defaults to the tenant's own property.
    pub property_id: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateComplaintStatusRequest {
    pub status: ComplaintStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_moves_forward_and_stops_at_resolved() {
        assert_eq!(ComplaintStatus::Open.next(), ComplaintStatus::InProgress);
        assert_eq!(ComplaintStatus::InProgress.next(), ComplaintStatus::Resolved);
        assert_eq!(ComplaintStatus::Resolved.next(), ComplaintStatus::Resolved);
    }

    #[test]
    fn in_progress_wire_name() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }
}
