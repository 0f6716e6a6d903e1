//! CommunityEvent aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventStatus;
use crate::domain::foundation::{EventId, Money};

/// A scheduled community event with finite capacity.
///
/// `registered_participants` is a derived counter: it always equals the
/// number of non-cancelled registrations and is only ever mutated inside the
/// same database transaction as the registration row change it reflects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityEvent {
    pub id: EventId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub max_participants: u32,
    pub registered_participants: u32,
    pub price: Money,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommunityEvent {
    /// Returns true if no payment is required to register.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    /// Returns true when every seat is taken.
    ///
    /// Advisory outside a transaction: the authoritative check happens under
    /// a row lock together with the registration insert.
    pub fn is_full(&self) -> bool {
        self.registered_participants >= self.max_participants
    }

    /// Remaining open seats.
    pub fn seats_remaining(&self) -> u32 {
        self.max_participants.saturating_sub(self.registered_participants)
    }
}
