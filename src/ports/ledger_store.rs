//! LedgerStore port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::DomainError;
use crate::domain::ledger::LedgerEntry;
use crate::domain::payment::BillingType;

/// Port for ledger persistence.
///
/// Settlement and voiding are keyed by the correlated gateway payment id -
/// an explicit foreign key, never text matching against descriptions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert(&self, entry: &LedgerEntry) -> Result<(), DomainError>;

    /// Marks the entry correlated to `payment_id` settled, recording the
    /// method the payer actually used. Idempotent; returns false when no
    /// correlated entry exists.
    async fn settle_by_payment(
        &self,
        payment_id: &str,
        method: Option<BillingType>,
        settled_on: NaiveDate,
    ) -> Result<bool, DomainError>;

    /// Voids the entry correlated to `payment_id` (cancelled charge).
    /// Idempotent; returns false when no correlated entry exists.
    async fn void_by_payment(&self, payment_id: &str) -> Result<bool, DomainError>;
}
