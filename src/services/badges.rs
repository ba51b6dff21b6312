//! Badge identifiers, approval tokens, and admission pass rendering

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use qrcode::QrCode;
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use std::io::Cursor;

use crate::error::{AppError, AppResult};

/// Length of the random portion of approval tokens
const TOKEN_LEN: usize = 26;

/// Prefix distinguishing pre-approval tokens from ordinary approval tokens
const PRE_APPROVAL_TOKEN_PREFIX: &str = "PRE-";

#[derive(Clone)]
pub struct BadgeService;

impl BadgeService {
    pub fn new() -> Self {
        Self
    }

    /// Badge id for a walk-in registration, e.g. `VIS-1700000000000`
    pub fn walkin_badge_id(&self, now: DateTime<Utc>) -> String {
        format!("VIS-{}", now.timestamp_millis())
    }

    /// Badge id for a pre-approved visit, e.g. `PRE-VIS-1700000000000`
    pub fn preapproval_badge_id(&self, now: DateTime<Utc>) -> String {
        format!("PRE-VIS-{}", now.timestamp_millis())
    }

    /// Opaque single-use approval token
    pub fn approval_token(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect()
    }

    /// Pre-approval token, distinguishable by prefix
    pub fn preapproval_token(&self) -> String {
        format!("{}{}", PRE_APPROVAL_TOKEN_PREFIX, self.approval_token())
    }

    /// Encode an admission payload as a QR code and return it as a PNG data
    /// URL. Unlike notification delivery, a failure here aborts the
    /// enclosing operation.
    pub fn encode_admission_pass<T: Serialize>(&self, payload: &T) -> AppResult<String> {
        let json = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(format!("Failed to serialize admission pass: {}", e)))?;

        let qr = QrCode::new(json.as_bytes())
            .map_err(|e| AppError::Internal(format!("Failed to generate QR code: {}", e)))?;

        let qr_image = qr.render::<image::Luma<u8>>().quiet_zone(false).build();

        let mut bytes: Vec<u8> = Vec::new();
        qr_image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| AppError::Internal(format!("Failed to encode QR code: {}", e)))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(&bytes)))
    }
}

impl Default for BadgeService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_id_formats() {
        let badges = BadgeService::new();
        let now = Utc::now();

        let walkin = badges.walkin_badge_id(now);
        let pre = badges.preapproval_badge_id(now);

        assert_eq!(walkin, format!("VIS-{}", now.timestamp_millis()));
        assert_eq!(pre, format!("PRE-VIS-{}", now.timestamp_millis()));
    }

    #[test]
    fn test_token_prefixes() {
        let badges = BadgeService::new();

        let token = badges.approval_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!token.starts_with("PRE-"));

        let pre_token = badges.preapproval_token();
        assert!(pre_token.starts_with("PRE-"));
        assert_eq!(pre_token.len(), TOKEN_LEN + 4);
    }

    #[test]
    fn test_tokens_are_unique() {
        let badges = BadgeService::new();
        assert_ne!(badges.approval_token(), badges.approval_token());
    }

    #[test]
    fn test_encode_admission_pass_returns_data_url() {
        let badges = BadgeService::new();
        let pass = serde_json::json!({ "visitorId": 1, "approved": true });

        let url = badges.encode_admission_pass(&pass).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
