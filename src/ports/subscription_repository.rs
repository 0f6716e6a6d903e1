//! SubscriptionRepository port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, MemberId, SubscriptionId};
use crate::domain::subscription::{DuesSubscription, SubscriptionStatus};

/// Port for dues subscription persistence.
///
/// Implementations enforce "at most one active subscription per member"
/// with a partial unique index; `insert` maps that violation to
/// `ErrorCode::AlreadySubscribed` so concurrent activations race safely.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn insert(&self, subscription: &DuesSubscription) -> Result<(), DomainError>;

    async fn find_active_by_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<DuesSubscription>, DomainError>;

    /// Sets the status of a subscription. Returns false if it does not exist.
    async fn set_status(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError>;

    /// Advances the next due date after a settled installment. Returns
    /// false if the subscription does not exist.
    async fn advance_next_due(
        &self,
        id: &SubscriptionId,
        next_due_date: NaiveDate,
    ) -> Result<bool, DomainError>;
}
