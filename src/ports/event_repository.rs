//! EventRepository port.

use async_trait::async_trait;

use crate::domain::event::{CommunityEvent, EventStatus};
use crate::domain::foundation::{DomainError, EventId};

/// Port for event persistence.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<CommunityEvent>, DomainError>;

    /// Compare-and-set status update.
    ///
    /// Writes `to` only if the stored status still equals `from`; returns
    /// false when the row changed underneath (e.g. a concurrent admin
    /// cancellation), in which case the caller keeps the stored value.
    async fn update_status(
        &self,
        id: &EventId,
        from: EventStatus,
        to: EventStatus,
    ) -> Result<bool, DomainError>;

    /// All events in non-terminal statuses, for the periodic lifecycle tick.
    async fn list_reconcilable(&self) -> Result<Vec<CommunityEvent>, DomainError>;
}
