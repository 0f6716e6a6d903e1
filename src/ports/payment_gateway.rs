//! Payment gateway port.
//!
//! Defines the contract for the external payment provider. Implementations
//! handle customer provisioning, recurring subscriptions, and one-off
//! charges.
//!
//! # Design
//!
//! - **No transactional coupling**: a gateway call and the local write that
//!   follows it can fail independently; callers are structured so a retry
//!   after a partial failure is safe.
//! - **Bounded timeouts**: every call carries a timeout. A timeout is an
//!   *unknown outcome*, not a failure - the charge or customer may exist at
//!   the gateway. Callers must re-query local mirrors before re-calling.
//! - **Retry only what is idempotent**: `retryable` marks transport-level
//!   failures; domain rejections are never retried.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Money};
use crate::domain::payment::{BillingCycle, BillingType};

/// Port for the external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer; returns the provider's customer id.
    async fn create_customer(&self, request: NewCustomer) -> Result<CustomerRef, GatewayError>;

    /// Create a recurring subscription for an existing customer.
    async fn create_subscription(
        &self,
        request: NewGatewaySubscription,
    ) -> Result<GatewaySubscriptionRef, GatewayError>;

    /// Cancel a subscription at the provider.
    async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError>;

    /// Create a one-off charge; returns checkout information for the payer.
    async fn create_payment(&self, request: NewGatewayPayment)
        -> Result<GatewayCharge, GatewayError>;

    /// List charges whose external reference starts with `prefix`.
    ///
    /// Used by the reconciliation sweep to find charges that exist at the
    /// gateway without a matching local row.
    async fn payments_by_external_ref_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<GatewayChargeSummary>, GatewayError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    /// Internal member id (stored as provider metadata).
    pub member_id: MemberId,
    pub name: String,
    pub email: String,
}

/// Provider-side customer reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: String,
}

/// Request to create a recurring subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGatewaySubscription {
    pub customer_ref: String,
    pub billing_type: BillingType,
    pub value: Money,
    pub cycle: BillingCycle,
    pub next_due_date: NaiveDate,
    pub external_ref: String,
}

/// Provider-side subscription reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySubscriptionRef {
    pub id: String,
    pub next_due_date: NaiveDate,
}

/// Request to create a one-off charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGatewayPayment {
    pub customer_ref: String,
    pub billing_type: BillingType,
    pub value: Money,
    pub due_date: NaiveDate,
    pub description: String,
    pub external_ref: String,
}

/// A created charge with everything the payer needs to settle it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCharge {
    /// Provider's payment id.
    pub id: String,
    pub invoice_url: Option<String>,
    pub bank_slip_url: Option<String>,
    pub pix_code: Option<String>,
    pub due_date: NaiveDate,
}

/// Charge summary returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayChargeSummary {
    pub id: String,
    pub status: String,
    pub value: Money,
    pub external_ref: Option<String>,
}

/// Error from a gateway operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    /// The call timed out: the outcome at the provider is unknown.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Authentication, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Provider, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        DomainError::new(ErrorCode::GatewayUnavailable, err.message)
            .with_detail("gateway_code", err.code.to_string())
            .with_detail("retryable", err.retryable.to_string())
    }
}

/// Gateway error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Transport-level connectivity failure.
    Network,

    /// The call exceeded its bounded timeout; outcome unknown.
    Timeout,

    /// API credentials rejected.
    Authentication,

    /// The provider rejected the request as malformed.
    InvalidRequest,

    /// The referenced resource does not exist at the provider.
    NotFound,

    /// Provider-side failure (5xx).
    Provider,

    /// Anything else.
    Unknown,
}

impl GatewayErrorCode {
    /// True where an immediate retry of the same idempotent call is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::Network | GatewayErrorCode::Timeout | GatewayErrorCode::Provider
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::Network => "network",
            GatewayErrorCode::Timeout => "timeout",
            GatewayErrorCode::Authentication => "authentication",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::Provider => "provider",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn transport_failures_are_retryable() {
        assert!(GatewayErrorCode::Network.is_retryable());
        assert!(GatewayErrorCode::Timeout.is_retryable());
        assert!(GatewayErrorCode::Provider.is_retryable());

        assert!(!GatewayErrorCode::InvalidRequest.is_retryable());
        assert!(!GatewayErrorCode::Authentication.is_retryable());
        assert!(!GatewayErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::timeout("deadline exceeded");
        assert_eq!(err.to_string(), "timeout: deadline exceeded");
        assert!(err.retryable);
    }

    #[test]
    fn gateway_error_converts_to_domain_error() {
        let err: DomainError = GatewayError::provider("internal error").into();
        assert_eq!(err.code, ErrorCode::GatewayUnavailable);
        assert_eq!(err.details.get("retryable").map(String::as_str), Some("true"));
    }
}
