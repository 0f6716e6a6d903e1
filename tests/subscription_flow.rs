//! Dues subscription flows over the in-memory stores.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;

use garrison::adapters::gateway::MockPaymentGateway;
use garrison::application::handlers::subscription::{
    ActivateDuesSubscriptionCommand, ActivateDuesSubscriptionHandler,
    CancelDuesSubscriptionCommand, CancelDuesSubscriptionHandler,
};
use garrison::application::handlers::webhook::ProcessNotificationHandler;
use garrison::domain::foundation::{ErrorCode, Money};
use garrison::domain::member::Rank;
use garrison::domain::payment::{BillingType, ExternalRef};
use garrison::domain::subscription::SubscriptionStatus;
use garrison::domain::webhook::{GatewayNotification, PaymentPayload};

use common::TestStore;

fn activate_handler(
    store: &Arc<TestStore>,
    gateway: &Arc<MockPaymentGateway>,
) -> ActivateDuesSubscriptionHandler {
    ActivateDuesSubscriptionHandler::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        Money::from_cents(5000),
    )
}

#[tokio::test]
async fn aluno_cannot_activate_but_soldado_can() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let handler = activate_handler(&store, &gateway);

    let aluno = store.seed_member(Rank::Aluno);
    let err = handler
        .handle(ActivateDuesSubscriptionCommand {
            member_id: aluno.id,
            billing_type: BillingType::Pix,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotEligible);

    let soldado = store.seed_member(Rank::Soldado);
    let subscription = handler
        .handle(ActivateDuesSubscriptionCommand {
            member_id: soldado.id,
            billing_type: BillingType::Pix,
        })
        .await
        .unwrap();

    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.value, Money::from_cents(5000));
    assert_eq!(store.subscription_of(&soldado.id).unwrap().id, subscription.id);
}

#[tokio::test]
async fn second_activation_is_rejected() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let handler = activate_handler(&store, &gateway);
    let member = store.seed_member(Rank::Sargento);

    handler
        .handle(ActivateDuesSubscriptionCommand {
            member_id: member.id,
            billing_type: BillingType::Boleto,
        })
        .await
        .unwrap();
    let err = handler
        .handle(ActivateDuesSubscriptionCommand {
            member_id: member.id,
            billing_type: BillingType::Boleto,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::AlreadySubscribed);
}

#[tokio::test]
async fn activation_reuses_the_member_gateway_customer() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let handler = activate_handler(&store, &gateway);
    let member = store.seed_member(Rank::Cabo);

    handler
        .handle(ActivateDuesSubscriptionCommand {
            member_id: member.id,
            billing_type: BillingType::Pix,
        })
        .await
        .unwrap();

    // The mapping was persisted; a later activation for the same member
    // (after cancellation) must not create another customer.
    assert_eq!(gateway.created_customers().len(), 1);
    let cancel = CancelDuesSubscriptionHandler::new(store.clone(), gateway.clone());
    cancel
        .handle(CancelDuesSubscriptionCommand { member_id: member.id })
        .await
        .unwrap();
    handler
        .handle(ActivateDuesSubscriptionCommand {
            member_id: member.id,
            billing_type: BillingType::Pix,
        })
        .await
        .unwrap();
    assert_eq!(gateway.created_customers().len(), 1);
}

#[tokio::test]
async fn cancellation_cancels_at_the_gateway_first() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let member = store.seed_member(Rank::Tenente);
    let subscription = activate_handler(&store, &gateway)
        .handle(ActivateDuesSubscriptionCommand {
            member_id: member.id,
            billing_type: BillingType::CreditCard,
        })
        .await
        .unwrap();

    CancelDuesSubscriptionHandler::new(store.clone(), gateway.clone())
        .handle(CancelDuesSubscriptionCommand { member_id: member.id })
        .await
        .unwrap();

    assert_eq!(
        gateway.cancelled_subscriptions(),
        vec![subscription.gateway_subscription_id]
    );
    assert_eq!(
        store.subscription_of(&member.id).unwrap().status,
        SubscriptionStatus::Cancelled
    );
}

#[tokio::test]
async fn gateway_failure_during_cancellation_keeps_local_state_active() {
    let store = TestStore::new();
    let gateway = Arc::new(MockPaymentGateway::new());
    let member = store.seed_member(Rank::Major);
    activate_handler(&store, &gateway)
        .handle(ActivateDuesSubscriptionCommand {
            member_id: member.id,
            billing_type: BillingType::Pix,
        })
        .await
        .unwrap();

    gateway.fail_next_call();
    let err = CancelDuesSubscriptionHandler::new(store.clone(), gateway.clone())
        .handle(CancelDuesSubscriptionCommand { member_id: member.id })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::GatewayUnavailable);
    // Never "cancelled locally, still billing remotely".
    assert_eq!(
        store.subscription_of(&member.id).unwrap().status,
        SubscriptionStatus::Active
    );

    // The retry converges.
    CancelDuesSubscriptionHandler::new(store.clone(), gateway.clone())
        .handle(CancelDuesSubscriptionCommand { member_id: member.id })
        .await
        .unwrap();
    assert_eq!(
        store.subscription_of(&member.id).unwrap().status,
        SubscriptionStatus::Cancelled
    );
}

#[tokio::test]
async fn settled_installment_advances_the_next_due_date() {
    let store = TestStore::new();
    let member = store.seed_member(Rank::Soldado);
    store.seed_subscription(member.id, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

    let processor = ProcessNotificationHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    processor
        .handle(GatewayNotification {
            id: "evt_dues_paid".to_string(),
            event_type: "PAYMENT_RECEIVED".to_string(),
            payment: PaymentPayload {
                id: "pay_dues_1".to_string(),
                value: 5000,
                net_value: Some(4880),
                billing_type: Some("BOLETO".to_string()),
                due_date: NaiveDate::from_ymd_opt(2025, 1, 15),
                payment_date: NaiveDate::from_ymd_opt(2025, 1, 15),
                external_reference: Some(ExternalRef::for_dues(member.id).to_string()),
            },
        })
        .await
        .unwrap();

    assert_eq!(
        store.subscription_of(&member.id).unwrap().next_due_date,
        NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
    );
}

#[tokio::test]
async fn overdue_installment_expires_the_subscription() {
    let store = TestStore::new();
    let member = store.seed_member(Rank::Soldado);
    store.seed_subscription(member.id, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

    let processor = ProcessNotificationHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    processor
        .handle(GatewayNotification {
            id: "evt_dues_overdue".to_string(),
            event_type: "PAYMENT_OVERDUE".to_string(),
            payment: PaymentPayload {
                id: "pay_dues_2".to_string(),
                value: 5000,
                net_value: None,
                billing_type: Some("BOLETO".to_string()),
                due_date: NaiveDate::from_ymd_opt(2025, 1, 15),
                payment_date: None,
                external_reference: Some(ExternalRef::for_dues(member.id).to_string()),
            },
        })
        .await
        .unwrap();

    assert_eq!(
        store.subscription_of(&member.id).unwrap().status,
        SubscriptionStatus::Expired
    );
}
