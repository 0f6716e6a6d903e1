//! Local mirror of a gateway charge.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BillingType, PaymentStatus};
use crate::domain::foundation::Money;

/// Mirror of a single gateway charge (one-off or subscription installment).
///
/// Keyed by the gateway's own payment id. The mirror is written with upserts
/// so webhook events can arrive in any order: a RECEIVED notification for a
/// charge whose CREATED event never arrived still materializes the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Gateway payment id (primary key).
    pub gateway_id: String,

    /// Gross charge amount.
    pub value: Money,

    /// Amount net of gateway fees; known after settlement.
    pub net_value: Option<Money>,

    pub status: PaymentStatus,
    pub billing_type: BillingType,
    pub due_date: NaiveDate,

    /// Date the payer settled, reported by the gateway.
    pub payment_date: Option<NaiveDate>,

    /// Correlation reference back to a registration or subscription.
    pub external_ref: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// A freshly-created charge awaiting payment.
    pub fn pending(
        gateway_id: impl Into<String>,
        value: Money,
        billing_type: BillingType,
        due_date: NaiveDate,
        external_ref: Option<String>,
    ) -> Self {
        Self {
            gateway_id: gateway_id.into(),
            value,
            net_value: None,
            status: PaymentStatus::Pending,
            billing_type,
            due_date,
            payment_date: None,
            external_ref,
            created_at: Utc::now(),
        }
    }
}
