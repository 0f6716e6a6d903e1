//! WebhookEventRepository port - the idempotency ledger.
//!
//! Every inbound notification is stored before it is dispatched
//! (store-then-process). The gateway event id is the primary key, so two
//! concurrent deliveries of the same notification cannot both claim it:
//! the insert races on the database constraint and exactly one wins.
//!
//! A row whose `processed` flag never became true marks a dispatch that
//! failed or a crash between claim and completion; such rows are retryable
//! and double as the manual-reconciliation queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Stored inbound notification.
#[derive(Debug, Clone)]
pub struct StoredNotification {
    /// Gateway event id (primary key).
    pub event_id: String,
    pub event_type: String,
    /// Original payload, for out-of-band redispatch and debugging.
    pub payload: serde_json::Value,
    pub processed: bool,
    pub received_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    /// Last dispatch error, if any.
    pub last_error: Option<String>,
}

/// Outcome of attempting to claim a notification for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// First sighting; the row was inserted unprocessed.
    Claimed,

    /// The row exists but was never marked processed - a redelivery after
    /// a crash or dispatch failure. Dispatch runs again; every dispatch
    /// step is an idempotent upsert, so re-entry is safe.
    Redelivery,

    /// Already fully processed; the delivery is a duplicate and a no-op.
    AlreadyProcessed,
}

/// Port for the webhook idempotency ledger.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Stores the notification (processed = false) in its own transaction,
    /// or reports how a previously-stored row stands.
    async fn claim(
        &self,
        event_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<ClaimOutcome, DomainError>;

    /// Marks the notification processed. Called only after dispatch
    /// committed successfully.
    async fn mark_processed(&self, event_id: &str) -> Result<(), DomainError>;

    /// Records a dispatch failure, leaving the row unprocessed.
    async fn record_failure(&self, event_id: &str, error: &str) -> Result<(), DomainError>;

    /// Unprocessed rows received before `older_than`, oldest first, for
    /// out-of-band retry.
    async fn find_unprocessed(
        &self,
        older_than: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredNotification>, DomainError>;
}
