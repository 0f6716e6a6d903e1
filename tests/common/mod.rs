//! Shared in-memory test fixtures.
//!
//! `TestStore` implements every store port over one mutex-guarded state,
//! reproducing the constraint semantics the Postgres adapters rely on: the
//! capacity-checked atomic registration insert, the unique (event, member)
//! pair, the single-active-subscription index, and the webhook
//! claim-by-primary-key. Holding one lock across each operation gives the
//! same atomicity the real adapters get from database transactions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use garrison::domain::event::{
    CommunityEvent, EventRegistration, EventStatus, RegistrationPaymentStatus,
};
use garrison::domain::foundation::{
    DomainError, ErrorCode, EventId, MemberId, Money, SubscriptionId,
};
use garrison::domain::ledger::LedgerEntry;
use garrison::domain::member::{Member, Rank};
use garrison::domain::payment::{BillingType, PaymentRecord, PaymentStatus};
use garrison::domain::subscription::{DuesSubscription, SubscriptionStatus};
use garrison::ports::{
    ClaimOutcome, EventRepository, LedgerStore, MemberRepository, NewPaidRegistration,
    PaymentRepository, RegistrationDenial, RegistrationInsert, RegistrationStore,
    StoredNotification, SubscriptionRepository, WebhookEventRepository,
};

#[derive(Default)]
struct State {
    members: HashMap<MemberId, Member>,
    events: HashMap<EventId, CommunityEvent>,
    registrations: HashMap<(EventId, MemberId), EventRegistration>,
    subscriptions: Vec<DuesSubscription>,
    payments: HashMap<String, PaymentRecord>,
    ledger: Vec<LedgerEntry>,
    webhook_rows: HashMap<String, StoredNotification>,
}

/// One in-memory store implementing every persistence port.
#[derive(Default)]
pub struct TestStore {
    state: Mutex<State>,
}

impl TestStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ── Seeding ──────────────────────────────────────────────────────────

    pub fn seed_member(&self, rank: Rank) -> Member {
        let mut member = Member::new(MemberId::new(), "Ana Silva", "ana@example.com");
        member.rank = rank;
        self.state
            .lock()
            .unwrap()
            .members
            .insert(member.id, member.clone());
        member
    }

    pub fn seed_event(&self, price_cents: i64, max_participants: u32) -> CommunityEvent {
        let now = Utc::now();
        let event = CommunityEvent {
            id: EventId::new(),
            title: "Winter field camp".to_string(),
            starts_at: now + Duration::days(30),
            ends_at: now + Duration::days(32),
            max_participants,
            registered_participants: 0,
            price: Money::from_cents(price_cents),
            status: EventStatus::RegistrationOpen,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .events
            .insert(event.id, event.clone());
        event
    }

    pub fn seed_subscription(&self, member_id: MemberId, next_due: NaiveDate) -> DuesSubscription {
        let subscription = DuesSubscription::activate(
            member_id,
            format!("sub_seed_{}", member_id),
            garrison::domain::payment::BillingCycle::Monthly,
            Money::from_cents(5000),
            next_due,
        );
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .push(subscription.clone());
        subscription
    }

    // ── Inspection ───────────────────────────────────────────────────────

    pub fn event(&self, id: &EventId) -> CommunityEvent {
        self.state.lock().unwrap().events[id].clone()
    }

    pub fn registration(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Option<EventRegistration> {
        self.state
            .lock()
            .unwrap()
            .registrations
            .get(&(*event_id, *member_id))
            .cloned()
    }

    /// Count of registrations currently holding a seat for the event.
    pub fn seat_holders(&self, event_id: &EventId) -> usize {
        self.state
            .lock()
            .unwrap()
            .registrations
            .values()
            .filter(|r| &r.event_id == event_id && r.payment_status.holds_seat())
            .count()
    }

    pub fn payment(&self, gateway_id: &str) -> Option<PaymentRecord> {
        self.state.lock().unwrap().payments.get(gateway_id).cloned()
    }

    pub fn ledger_entries_for(&self, payment_id: &str) -> Vec<LedgerEntry> {
        self.state
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|e| e.payment_id.as_deref() == Some(payment_id))
            .cloned()
            .collect()
    }

    pub fn subscription_of(&self, member_id: &MemberId) -> Option<DuesSubscription> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|s| &s.member_id == member_id)
            .last()
            .cloned()
    }

    pub fn webhook_row(&self, event_id: &str) -> Option<StoredNotification> {
        self.state
            .lock()
            .unwrap()
            .webhook_rows
            .get(event_id)
            .cloned()
    }
}

#[async_trait]
impl MemberRepository for TestStore {
    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        Ok(self.state.lock().unwrap().members.get(id).cloned())
    }

    async fn set_gateway_customer(
        &self,
        id: &MemberId,
        gateway_customer_id: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if let Some(member) = state.members.get_mut(id) {
            if member.gateway_customer_id.is_none() {
                member.gateway_customer_id = Some(gateway_customer_id.to_string());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for TestStore {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<CommunityEvent>, DomainError> {
        Ok(self.state.lock().unwrap().events.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &EventId,
        from: EventStatus,
        to: EventStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(event) = state.events.get_mut(id) else {
            return Ok(false);
        };
        if event.status != from {
            return Ok(false);
        }
        event.status = to;
        Ok(true)
    }

    async fn list_reconcilable(&self) -> Result<Vec<CommunityEvent>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .events
            .values()
            .filter(|e| !e.status.is_terminal())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RegistrationStore for TestStore {
    async fn insert(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
        paid: Option<NewPaidRegistration>,
    ) -> Result<RegistrationInsert, DomainError> {
        // Whole check-and-insert under one lock, like the row-locked
        // transaction in the Postgres adapter.
        let mut state = self.state.lock().unwrap();

        let Some(event) = state.events.get(event_id) else {
            return Err(DomainError::new(ErrorCode::EventNotFound, "Event not found"));
        };
        if !event.status.accepts_registrations() {
            return Ok(RegistrationInsert::Denied(RegistrationDenial::Closed(
                event.status,
            )));
        }
        if event.registered_participants >= event.max_participants {
            return Ok(RegistrationInsert::Denied(RegistrationDenial::Full));
        }
        if state.registrations.contains_key(&(*event_id, *member_id)) {
            return Ok(RegistrationInsert::Denied(RegistrationDenial::AlreadyRegistered));
        }

        let registration = match &paid {
            Some(p) => {
                EventRegistration::pending(*event_id, *member_id, p.payment.gateway_id.clone())
            }
            None => EventRegistration::free(*event_id, *member_id),
        };

        state
            .registrations
            .insert((*event_id, *member_id), registration.clone());
        if let Some(event) = state.events.get_mut(event_id) {
            event.registered_participants += 1;
        }
        if let Some(p) = paid {
            state
                .payments
                .entry(p.payment.gateway_id.clone())
                .or_insert(p.payment);
            state.ledger.push(p.ledger_entry);
        }

        Ok(RegistrationInsert::Inserted(registration))
    }

    async fn remove(&self, event_id: &EventId, member_id: &MemberId) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(removed) = state.registrations.remove(&(*event_id, *member_id)) else {
            return Ok(false);
        };
        if removed.payment_status.holds_seat() {
            if let Some(event) = state.events.get_mut(event_id) {
                event.registered_participants = event.registered_participants.saturating_sub(1);
            }
        }
        Ok(true)
    }

    async fn find(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<Option<EventRegistration>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .registrations
            .get(&(*event_id, *member_id))
            .cloned())
    }

    async fn mark_paid(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
        amount: Money,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(registration) = state.registrations.get_mut(&(*event_id, *member_id)) else {
            return Ok(false);
        };
        if registration.payment_status == RegistrationPaymentStatus::Cancelled {
            return Ok(false);
        }
        registration.payment_status = RegistrationPaymentStatus::Paid;
        registration.amount_paid = amount;
        Ok(true)
    }

    async fn cancel_and_release_seat(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(registration) = state.registrations.get_mut(&(*event_id, *member_id)) else {
            return Ok(false);
        };
        if registration.payment_status != RegistrationPaymentStatus::Cancelled {
            registration.payment_status = RegistrationPaymentStatus::Cancelled;
            if let Some(event) = state.events.get_mut(event_id) {
                event.registered_participants = event.registered_participants.saturating_sub(1);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl SubscriptionRepository for TestStore {
    async fn insert(&self, subscription: &DuesSubscription) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let already_active = state
            .subscriptions
            .iter()
            .any(|s| s.member_id == subscription.member_id && s.status.is_active());
        if already_active {
            return Err(DomainError::new(
                ErrorCode::AlreadySubscribed,
                "Member already has an active dues subscription",
            ));
        }
        state.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn find_active_by_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<DuesSubscription>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| &s.member_id == member_id && s.status.is_active())
            .cloned())
    }

    async fn set_status(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(subscription) = state.subscriptions.iter_mut().find(|s| &s.id == id) else {
            return Ok(false);
        };
        subscription.status = status;
        Ok(true)
    }

    async fn advance_next_due(
        &self,
        id: &SubscriptionId,
        next_due_date: NaiveDate,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(subscription) = state.subscriptions.iter_mut().find(|s| &s.id == id) else {
            return Ok(false);
        };
        if subscription.next_due_date >= next_due_date {
            return Ok(false);
        }
        subscription.next_due_date = next_due_date;
        Ok(true)
    }
}

#[async_trait]
impl PaymentRepository for TestStore {
    async fn find(&self, gateway_id: &str) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.state.lock().unwrap().payments.get(gateway_id).cloned())
    }

    async fn insert(&self, record: &PaymentRecord) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.payments.contains_key(&record.gateway_id) {
            return Ok(false);
        }
        state
            .payments
            .insert(record.gateway_id.clone(), record.clone());
        Ok(true)
    }

    async fn advance_status(
        &self,
        gateway_id: &str,
        to: PaymentStatus,
        payment_date: Option<NaiveDate>,
        net_value: Option<Money>,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(record) = state.payments.get_mut(gateway_id) else {
            return Ok(false);
        };
        if !record.status.can_advance_to(&to) {
            return Ok(false);
        }
        record.status = to;
        if payment_date.is_some() {
            record.payment_date = payment_date;
        }
        if net_value.is_some() {
            record.net_value = net_value;
        }
        Ok(true)
    }

    async fn find_stale_pending(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .payments
            .values()
            .filter(|p| p.status == PaymentStatus::Pending && p.due_date <= cutoff)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerStore for TestStore {
    async fn insert(&self, entry: &LedgerEntry) -> Result<(), DomainError> {
        self.state.lock().unwrap().ledger.push(entry.clone());
        Ok(())
    }

    async fn settle_by_payment(
        &self,
        payment_id: &str,
        method: Option<BillingType>,
        settled_on: NaiveDate,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = false;
        for entry in state
            .ledger
            .iter_mut()
            .filter(|e| e.payment_id.as_deref() == Some(payment_id))
            .filter(|e| e.status != garrison::domain::ledger::EntryStatus::Void)
        {
            entry.status = garrison::domain::ledger::EntryStatus::Settled;
            if method.is_some() {
                entry.settled_method = method;
            }
            entry.entry_date = settled_on;
            updated = true;
        }
        Ok(updated)
    }

    async fn void_by_payment(&self, payment_id: &str) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = false;
        for entry in state
            .ledger
            .iter_mut()
            .filter(|e| e.payment_id.as_deref() == Some(payment_id))
        {
            entry.status = garrison::domain::ledger::EntryStatus::Void;
            updated = true;
        }
        Ok(updated)
    }
}

#[async_trait]
impl WebhookEventRepository for TestStore {
    async fn claim(
        &self,
        event_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<ClaimOutcome, DomainError> {
        let mut state = self.state.lock().unwrap();
        match state.webhook_rows.get(event_id) {
            Some(row) if row.processed => Ok(ClaimOutcome::AlreadyProcessed),
            Some(_) => Ok(ClaimOutcome::Redelivery),
            None => {
                state.webhook_rows.insert(
                    event_id.to_string(),
                    StoredNotification {
                        event_id: event_id.to_string(),
                        event_type: event_type.to_string(),
                        payload,
                        processed: false,
                        received_at: Utc::now(),
                        processed_at: None,
                        last_error: None,
                    },
                );
                Ok(ClaimOutcome::Claimed)
            }
        }
    }

    async fn mark_processed(&self, event_id: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.webhook_rows.get_mut(event_id) {
            row.processed = true;
            row.processed_at = Some(Utc::now());
            row.last_error = None;
        }
        Ok(())
    }

    async fn record_failure(&self, event_id: &str, error: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.webhook_rows.get_mut(event_id) {
            row.last_error = Some(error.to_string());
        }
        Ok(())
    }

    async fn find_unprocessed(
        &self,
        older_than: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredNotification>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<StoredNotification> = state
            .webhook_rows
            .values()
            .filter(|r| !r.processed && r.received_at < older_than)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.received_at);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
