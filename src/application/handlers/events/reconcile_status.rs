//! ReconcileEventStatusHandler - persists date-driven status changes.
//!
//! The pure computation lives in `domain::event::reconcile_status`; this
//! handler loads, computes, and writes the result under a compare-and-set
//! so a concurrent administrative change (a manual cancellation above all)
//! is never clobbered. Runs on read and from a periodic background tick.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::event::{reconcile_status, CommunityEvent};
use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::ports::EventRepository;

/// Handler for event status reconciliation.
pub struct ReconcileEventStatusHandler {
    events: Arc<dyn EventRepository>,
}

impl ReconcileEventStatusHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Reconciles one event, returning it with its up-to-date status.
    pub async fn handle(
        &self,
        event_id: &EventId,
        now: DateTime<Utc>,
    ) -> Result<CommunityEvent, DomainError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::EventNotFound, "Event not found"))?;

        let next = reconcile_status(event.status, event.starts_at, event.ends_at, now);
        if next == event.status {
            return Ok(event);
        }

        if self.events.update_status(event_id, event.status, next).await? {
            let mut updated = event;
            updated.status = next;
            return Ok(updated);
        }

        // Lost the compare-and-set to a concurrent change (typically an
        // admin cancellation); the stored value wins.
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::EventNotFound, "Event not found"))
    }

    /// Reconciles every non-terminal event; used by the periodic tick.
    /// Returns the number of events whose status changed.
    pub async fn reconcile_all(&self, now: DateTime<Utc>) -> Result<u32, DomainError> {
        let mut changed = 0;
        for event in self.events.list_reconcilable().await? {
            let next = reconcile_status(event.status, event.starts_at, event.ends_at, now);
            if next != event.status
                && self.events.update_status(&event.id, event.status, next).await?
            {
                tracing::info!(event_id = %event.id, from = %event.status, to = %next, "event status advanced");
                changed += 1;
            }
        }
        Ok(changed)
    }
}
