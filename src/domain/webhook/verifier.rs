//! Gateway webhook signature verification.
//!
//! The gateway signs every delivery with HMAC-SHA256 over
//! `"{timestamp}.{body}"` and sends the result in the
//! `X-Gateway-Signature` header as `t=<unix_ts>,s=<hex>`. Verification uses
//! constant-time comparison and bounds the timestamp to defeat replays.
//! Unsigned or badly-signed deliveries are rejected before the idempotency
//! store is ever touched.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::notification::GatewayNotification;
use super::WebhookError;

/// Maximum allowed age for a delivery (5 minutes).
const MAX_NOTIFICATION_AGE_SECS: i64 = 300;

/// Clock-skew tolerance for timestamps from the future (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    /// Unix timestamp the signature covers.
    pub timestamp: i64,
    /// HMAC-SHA256 signature bytes.
    pub signature: Vec<u8>,
}

impl SignatureParts {
    /// Parses a signature header of the form `t=<timestamp>,s=<hex>`.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "s" => {
                    signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid signature hex".to_string())
                    })?);
                }
                // Unknown fields are ignored for forward compatibility.
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let signature =
            signature.ok_or_else(|| WebhookError::ParseError("missing signature".to_string()))?;

        Ok(SignatureParts { timestamp, signature })
    }
}

/// Verifier for gateway webhook deliveries.
pub struct NotificationVerifier {
    secret: SecretString,
}

impl NotificationVerifier {
    /// Creates a verifier with the shared signing secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the delivery signature and parses the notification.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - signature does not match the payload
    /// - `TimestampOutOfRange` - delivery older than 5 minutes
    /// - `InvalidTimestamp` - timestamp in the future beyond tolerance
    /// - `ParseError` - malformed header or JSON payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<GatewayNotification, WebhookError> {
        let parts = SignatureParts::parse(signature_header)?;

        self.validate_timestamp(parts.timestamp)?;

        let expected = self.compute_signature(parts.timestamp, payload);
        if !constant_time_compare(&expected, &parts.signature) {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let age = chrono::Utc::now().timestamp() - timestamp;

        if age > MAX_NOTIFICATION_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }
        Ok(())
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a valid signature header for test fixtures.
#[cfg(test)]
pub fn sign_for_test(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    format!("t={},s={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
