//! Webhook error types.

use thiserror::Error;

/// Errors that occur while verifying or parsing an inbound notification.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Notification timestamp is older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Notification timestamp is in the future beyond clock-skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the payload or the signature header.
    #[error("Parse error: {0}")]
    ParseError(String),
}
