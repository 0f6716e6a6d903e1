//! Webhook processing and reconciliation flows over the in-memory stores.

mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use garrison::adapters::gateway::MockPaymentGateway;
use garrison::application::handlers::reconciliation::ReconciliationSweepHandler;
use garrison::application::handlers::registration::{
    RegisterForEventCommand, RegisterForEventHandler,
};
use garrison::application::handlers::webhook::{NotificationOutcome, ProcessNotificationHandler};
use garrison::domain::event::RegistrationPaymentStatus;
use garrison::domain::ledger::EntryStatus;
use garrison::domain::member::Rank;
use garrison::domain::payment::{ExternalRef, PaymentStatus};
use garrison::domain::webhook::{GatewayNotification, PaymentPayload};

use common::TestStore;

fn processor(store: &Arc<TestStore>) -> ProcessNotificationHandler {
    ProcessNotificationHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    )
}

fn notification(
    event_id: &str,
    event_type: &str,
    payment_id: &str,
    external_ref: Option<String>,
) -> GatewayNotification {
    GatewayNotification {
        id: event_id.to_string(),
        event_type: event_type.to_string(),
        payment: PaymentPayload {
            id: payment_id.to_string(),
            value: 2500,
            net_value: Some(2410),
            billing_type: Some("PIX".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 17),
            payment_date: NaiveDate::from_ymd_opt(2025, 1, 11),
            external_reference: external_ref,
        },
    }
}

/// Registers a member for a priced event and returns the gateway payment id.
async fn paid_registration(
    store: &Arc<TestStore>,
    gateway: &Arc<MockPaymentGateway>,
) -> (garrison::domain::event::CommunityEvent, garrison::domain::member::Member, String) {
    let event = store.seed_event(2500, 5);
    let member = store.seed_member(Rank::Cabo);
    let handler = RegisterForEventHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
    );
    let result = handler
        .handle(RegisterForEventCommand {
            event_id: event.id,
            member_id: member.id,
        })
        .await
        .unwrap();
    let payment_id = result.payment.unwrap().gateway_payment_id;
    (event, member, payment_id)
}

#[tokio::test]
async fn payment_received_confirms_registration_and_settles_ledger() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let (event, member, payment_id) = paid_registration(&store, &gateway).await;
    let external = ExternalRef::for_event(event.id, member.id).to_string();

    let outcome = processor(&store)
        .handle(notification("evt_1", "PAYMENT_RECEIVED", &payment_id, Some(external)))
        .await
        .unwrap();

    assert!(matches!(outcome, NotificationOutcome::Processed));
    assert_eq!(
        store.registration(&event.id, &member.id).unwrap().payment_status,
        RegistrationPaymentStatus::Paid
    );
    assert_eq!(store.payment(&payment_id).unwrap().status, PaymentStatus::Received);
    let entries = store.ledger_entries_for(&payment_id);
    assert_eq!(entries[0].status, EntryStatus::Settled);
    // The ledger learned the method the payer actually used.
    assert_eq!(
        entries[0].settled_method,
        Some(garrison::domain::payment::BillingType::Pix)
    );
}

#[tokio::test]
async fn duplicate_delivery_produces_identical_state() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let (event, member, payment_id) = paid_registration(&store, &gateway).await;
    let external = ExternalRef::for_event(event.id, member.id).to_string();
    let handler = processor(&store);

    let make = || notification("evt_dup", "PAYMENT_RECEIVED", &payment_id, Some(external.clone()));
    let first = handler.handle(make()).await.unwrap();
    let snapshot_registration = store.registration(&event.id, &member.id).unwrap();
    let snapshot_payment = store.payment(&payment_id).unwrap();

    let second = handler.handle(make()).await.unwrap();

    assert!(matches!(first, NotificationOutcome::Processed));
    assert!(matches!(second, NotificationOutcome::AlreadyProcessed));
    let registration = store.registration(&event.id, &member.id).unwrap();
    assert_eq!(registration.payment_status, snapshot_registration.payment_status);
    assert_eq!(registration.amount_paid, snapshot_registration.amount_paid);
    assert_eq!(store.payment(&payment_id).unwrap().status, snapshot_payment.status);
    assert_eq!(store.event(&event.id).registered_participants, 1);
}

#[tokio::test]
async fn received_before_created_still_ends_received() {
    let store = TestStore::new();
    let handler = processor(&store);

    handler
        .handle(notification("evt_recv", "PAYMENT_RECEIVED", "pay_ooo", None))
        .await
        .unwrap();
    handler
        .handle(notification("evt_crt", "PAYMENT_CREATED", "pay_ooo", None))
        .await
        .unwrap();

    let record = store.payment("pay_ooo").unwrap();
    assert_eq!(record.status, PaymentStatus::Received);
    assert_eq!(record.net_value.map(|v| v.cents()), Some(2410));
}

#[tokio::test]
async fn cancellation_releases_the_seat_for_the_next_member() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());

    // Fill the single seat with a paid-pending registration.
    let event = store.seed_event(2500, 1);
    let member = store.seed_member(Rank::Cabo);
    let register = RegisterForEventHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
    );
    let result = register
        .handle(RegisterForEventCommand {
            event_id: event.id,
            member_id: member.id,
        })
        .await
        .unwrap();
    let payment_id = result.payment.unwrap().gateway_payment_id;
    assert_eq!(store.event(&event.id).registered_participants, 1);

    // Gateway reports the charge cancelled.
    let external = ExternalRef::for_event(event.id, member.id).to_string();
    processor(&store)
        .handle(notification("evt_cancel", "PAYMENT_CANCELLED", &payment_id, Some(external)))
        .await
        .unwrap();

    assert_eq!(
        store.registration(&event.id, &member.id).unwrap().payment_status,
        RegistrationPaymentStatus::Cancelled
    );
    assert_eq!(store.event(&event.id).registered_participants, 0);
    assert_eq!(store.ledger_entries_for(&payment_id)[0].status, EntryStatus::Void);

    // The freed seat can be taken.
    let next_member = store.seed_member(Rank::Soldado);
    register
        .handle(RegisterForEventCommand {
            event_id: event.id,
            member_id: next_member.id,
        })
        .await
        .unwrap();
    assert_eq!(store.event(&event.id).registered_participants, 1);
}

#[tokio::test]
async fn failed_dispatch_is_recovered_by_the_sweep() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let handler = Arc::new(processor(&store));

    // A RECEIVED notification for a registration that does not exist yet
    // (the local commit is still in flight elsewhere).
    let event = store.seed_event(2500, 5);
    let member = store.seed_member(Rank::Cabo);
    let external = ExternalRef::for_event(event.id, member.id).to_string();
    let outcome = handler
        .handle(notification("evt_late", "PAYMENT_RECEIVED", "pay_late", Some(external)))
        .await
        .unwrap();
    assert!(matches!(outcome, NotificationOutcome::Failed(_)));
    let row = store.webhook_row("evt_late").unwrap();
    assert!(!row.processed);
    assert!(row.last_error.is_some());

    // The registration materializes (e.g. the request path caught up).
    let register = RegisterForEventHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
    );
    register
        .handle(RegisterForEventCommand {
            event_id: event.id,
            member_id: member.id,
        })
        .await
        .unwrap();

    // The sweep replays the stored notification.
    let sweep = ReconciliationSweepHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
        handler,
        Duration::seconds(0),
        7,
    );
    let report = sweep.handle(Utc::now() + Duration::seconds(1)).await.unwrap();

    assert_eq!(report.retried, 1);
    assert_eq!(report.recovered, 1);
    assert!(store.webhook_row("evt_late").unwrap().processed);
    assert_eq!(
        store.registration(&event.id, &member.id).unwrap().payment_status,
        RegistrationPaymentStatus::Paid
    );
}

#[tokio::test]
async fn sweep_reports_charged_but_unregistered_members() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());

    // Create a paid registration, then simulate the partial failure by
    // removing the local rows while the gateway charge survives.
    let (event, member, _payment_id) = paid_registration(&store, &gateway).await;
    use garrison::ports::RegistrationStore;
    store.remove(&event.id, &member.id).await.unwrap();

    let handler = Arc::new(processor(&store));
    let sweep = ReconciliationSweepHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway.clone(),
        handler,
        Duration::minutes(5),
        7,
    );
    let report = sweep.handle(Utc::now()).await.unwrap();

    assert_eq!(report.orphaned_charges.len(), 1);
    assert_eq!(
        report.orphaned_charges[0].external_ref,
        ExternalRef::for_event(event.id, member.id).to_string()
    );
}
