//! Gateway webhook notification types.
//!
//! Mirrors the gateway's webhook payload format. Only fields relevant to
//! reconciliation are captured; everything else is ignored on parse.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;
use crate::domain::payment::{BillingType, PaymentRecord, PaymentStatus};

/// Event kinds the processor dispatches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEventKind {
    PaymentCreated,
    PaymentConfirmed,
    PaymentReceived,
    PaymentOverdue,
    PaymentCancelled,
    Unknown(String),
}

impl GatewayEventKind {
    /// Parses the wire event-type string.
    pub fn parse(s: &str) -> GatewayEventKind {
        match s {
            "PAYMENT_CREATED" => GatewayEventKind::PaymentCreated,
            "PAYMENT_CONFIRMED" => GatewayEventKind::PaymentConfirmed,
            "PAYMENT_RECEIVED" => GatewayEventKind::PaymentReceived,
            "PAYMENT_OVERDUE" => GatewayEventKind::PaymentOverdue,
            "PAYMENT_CANCELLED" => GatewayEventKind::PaymentCancelled,
            other => GatewayEventKind::Unknown(other.to_string()),
        }
    }
}

/// A raw inbound gateway notification.
///
/// The gateway retries delivery until it sees a 2xx, and does not guarantee
/// order or uniqueness; `id` is the dedup key for the idempotency ledger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayNotification {
    /// Gateway event id (evt_xxx format).
    pub id: String,

    /// Wire event type (e.g. "PAYMENT_RECEIVED").
    #[serde(rename = "event")]
    pub event_type: String,

    /// The charge this notification concerns.
    pub payment: PaymentPayload,
}

impl GatewayNotification {
    /// The typed event kind.
    pub fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::parse(&self.event_type)
    }
}

/// Charge fields carried in a notification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Gateway payment id.
    pub id: String,

    /// Gross amount in cents.
    pub value: i64,

    /// Net-of-fees amount in cents; present once settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_value: Option<i64>,

    /// Billing method; the settled method for RECEIVED events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,

    /// Correlation reference back to a local entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

impl PaymentPayload {
    /// The billing type, when present and recognized.
    pub fn parsed_billing_type(&self) -> Option<BillingType> {
        self.billing_type.as_deref().and_then(|s| s.parse().ok())
    }

    /// Materializes a local mirror row at `status` from this payload.
    ///
    /// Used when a notification arrives for a charge whose CREATED event
    /// was never delivered (out-of-order delivery).
    pub fn to_record(&self, status: PaymentStatus) -> PaymentRecord {
        let mut record = PaymentRecord::pending(
            self.id.clone(),
            Money::from_cents(self.value),
            self.parsed_billing_type().unwrap_or(BillingType::Undefined),
            self.due_date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
            self.external_reference.clone(),
        );
        record.status = status;
        record.net_value = self.net_value.map(Money::from_cents);
        record.payment_date = self.payment_date;
        record
    }
}
