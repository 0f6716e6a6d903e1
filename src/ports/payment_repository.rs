//! PaymentRepository port - the local mirror of gateway charges.
//!
//! The mirror is maintained exclusively with upserts and forward-only
//! status advances, so webhook deliveries can be applied in any order and
//! any number of times with the same end state.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::payment::{PaymentRecord, PaymentStatus};

/// Port for charge-mirror persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find(&self, gateway_id: &str) -> Result<Option<PaymentRecord>, DomainError>;

    /// Inserts a mirror row if none exists. Returns false when the row was
    /// already present (concurrent or repeated delivery); the caller then
    /// advances the existing row instead.
    async fn insert(&self, record: &PaymentRecord) -> Result<bool, DomainError>;

    /// Advances the status of an existing row, recording settlement fields
    /// when given. No-op (returns false) when the row is absent or the
    /// stored status cannot advance to `to` - re-applying a terminal status
    /// or receiving a stale event must not error or regress.
    async fn advance_status(
        &self,
        gateway_id: &str,
        to: PaymentStatus,
        payment_date: Option<NaiveDate>,
        net_value: Option<Money>,
    ) -> Result<bool, DomainError>;

    /// Pending charges whose due date is on or before `cutoff`; the
    /// reconciliation sweep flags these for manual follow-up.
    async fn find_stale_pending(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, DomainError>;
}
