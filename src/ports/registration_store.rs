//! RegistrationStore port - registrations and the capacity-checked insert.
//!
//! ## Why the insert is one operation
//!
//! Two members racing for the last open seat must not both succeed. The
//! status check, capacity check, registration insert, and counter increment
//! therefore happen inside a single database transaction that locks the
//! event row; the store reports the outcome instead of letting the caller
//! recheck-then-write. The unique `(event_id, member_id)` constraint backs
//! the duplicate check under the same race.
//!
//! The seat counter is only ever mutated here, in the same transaction as
//! the registration row change it reflects - never recomputed optimistically
//! outside one.

use async_trait::async_trait;

use crate::domain::event::{EventRegistration, EventStatus};
use crate::domain::foundation::{DomainError, EventId, MemberId, Money};
use crate::domain::ledger::LedgerEntry;
use crate::domain::payment::PaymentRecord;

/// Writes accompanying a paid registration, committed atomically with it:
/// the local charge mirror and the pending income ledger entry.
#[derive(Debug, Clone)]
pub struct NewPaidRegistration {
    pub payment: PaymentRecord,
    pub ledger_entry: LedgerEntry,
}

/// Why a registration insert was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationDenial {
    /// The (event, member) pair already has a registration.
    AlreadyRegistered,

    /// The event's status does not accept registrations.
    Closed(EventStatus),

    /// Every seat is taken.
    Full,
}

/// Outcome of an atomic registration insert.
#[derive(Debug, Clone)]
pub enum RegistrationInsert {
    /// The registration row exists and the seat counter was incremented.
    Inserted(EventRegistration),

    /// Nothing was written.
    Denied(RegistrationDenial),
}

/// Port for registration persistence.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Atomically re-checks status and capacity, inserts the registration,
    /// and increments the event's seat counter.
    ///
    /// When `paid` is given (priced events), the charge mirror and ledger
    /// entry are committed in the same transaction. When it is `None`, the
    /// registration is recorded as free.
    async fn insert(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
        paid: Option<NewPaidRegistration>,
    ) -> Result<RegistrationInsert, DomainError>;

    /// Deletes the registration and decrements the seat counter atomically
    /// (no decrement when the registration had already been cancelled).
    /// Returns false if no registration existed.
    async fn remove(&self, event_id: &EventId, member_id: &MemberId)
        -> Result<bool, DomainError>;

    async fn find(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<Option<EventRegistration>, DomainError>;

    /// Marks a registration paid, recording the amount. Idempotent: a
    /// second confirmation is a no-op. Returns false if no registration
    /// exists for the pair.
    async fn mark_paid(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
        amount: Money,
    ) -> Result<bool, DomainError>;

    /// Marks a registration cancelled and releases its seat, both in one
    /// transaction. Idempotent: cancelling twice decrements once. Returns
    /// false if no registration exists for the pair.
    async fn cancel_and_release_seat(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<bool, DomainError>;
}
