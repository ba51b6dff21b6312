//! Admission pass payloads encoded into visitor QR codes

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Payload encoded for an approved walk-in visitor
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedAdmission {
    pub visitor_id: i32,
    pub badge_id: String,
    pub name: String,
    pub approved: bool,
    pub timestamp: DateTime<Utc>,
}

/// Payload encoded for a pre-approved scheduled visit, including the
/// validity window and the quick check-in token
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreApprovedAdmission {
    pub visitor_id: i32,
    pub badge_id: String,
    pub name: String,
    pub pre_approved: bool,
    pub token: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub host_employee: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approved_payload_shape() {
        let pass = ApprovedAdmission {
            visitor_id: 7,
            badge_id: "VIS-1700000000000".to_string(),
            name: "Alice Doe".to_string(),
            approved: true,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&pass).unwrap();
        assert_eq!(json["visitorId"], 7);
        assert_eq!(json["badgeId"], "VIS-1700000000000");
        assert_eq!(json["approved"], true);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_pre_approved_payload_carries_window_and_token() {
        let now = Utc::now();
        let pass = PreApprovedAdmission {
            visitor_id: 3,
            badge_id: "PRE-VIS-1700000000000".to_string(),
            name: "Bob Vendor".to_string(),
            pre_approved: true,
            token: "PRE-abc123".to_string(),
            valid_from: now,
            valid_until: now + chrono::Duration::hours(1),
            host_employee: "Carol Host".to_string(),
        };

        let json = serde_json::to_value(&pass).unwrap();
        assert_eq!(json["preApproved"], true);
        assert_eq!(json["token"], "PRE-abc123");
        assert!(json["validFrom"].is_string());
        assert!(json["validUntil"].is_string());
    }
}
