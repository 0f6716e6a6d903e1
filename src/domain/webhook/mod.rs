//! Gateway webhook domain module.
//!
//! # Module Structure
//!
//! - `notification` - raw inbound notification and typed event kinds
//! - `verifier` - HMAC-SHA256 signature verification
//! - `errors` - webhook error types

mod errors;
mod notification;
mod verifier;

pub use errors::WebhookError;
pub use notification::{GatewayEventKind, GatewayNotification, PaymentPayload};
pub use verifier::{NotificationVerifier, SignatureParts};
