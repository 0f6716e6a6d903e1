//! Shared application state for the HTTP layer.

use std::sync::Arc;

use chrono::Duration;

use crate::application::handlers::events::ReconcileEventStatusHandler;
use crate::application::handlers::reconciliation::ReconciliationSweepHandler;
use crate::application::handlers::registration::{
    RegisterForEventHandler, UnregisterFromEventHandler,
};
use crate::application::handlers::reporting::TreasuryReportHandler;
use crate::application::handlers::subscription::{
    ActivateDuesSubscriptionHandler, CancelDuesSubscriptionHandler,
};
use crate::application::handlers::webhook::ProcessNotificationHandler;
use crate::domain::foundation::Money;
use crate::domain::webhook::NotificationVerifier;
use crate::ports::{
    EventRepository, LedgerStore, MemberRepository, PaymentGateway, PaymentRepository,
    RegistrationStore, SubscriptionRepository, TreasuryReader, WebhookEventRepository,
};

/// Shared state cloned into every request; all dependencies are Arc-wrapped
/// port implementations.
#[derive(Clone)]
pub struct AppState {
    pub members: Arc<dyn MemberRepository>,
    pub events: Arc<dyn EventRepository>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub ledger: Arc<dyn LedgerStore>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub treasury: Arc<dyn TreasuryReader>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub webhook_verifier: Arc<NotificationVerifier>,
    /// Monthly dues value, fixed by policy.
    pub dues_value: Money,
    /// Grace before the sweep retries an unprocessed notification.
    pub webhook_retry_grace: Duration,
    /// Days past due before a pending charge counts as stale.
    pub stale_pending_after_days: i64,
}

impl AppState {
    pub fn register_handler(&self) -> RegisterForEventHandler {
        RegisterForEventHandler::new(
            self.members.clone(),
            self.events.clone(),
            self.registrations.clone(),
            self.gateway.clone(),
        )
    }

    pub fn unregister_handler(&self) -> UnregisterFromEventHandler {
        UnregisterFromEventHandler::new(self.registrations.clone())
    }

    pub fn activate_subscription_handler(&self) -> ActivateDuesSubscriptionHandler {
        ActivateDuesSubscriptionHandler::new(
            self.members.clone(),
            self.subscriptions.clone(),
            self.gateway.clone(),
            self.dues_value,
        )
    }

    pub fn cancel_subscription_handler(&self) -> CancelDuesSubscriptionHandler {
        CancelDuesSubscriptionHandler::new(self.subscriptions.clone(), self.gateway.clone())
    }

    pub fn reconcile_handler(&self) -> ReconcileEventStatusHandler {
        ReconcileEventStatusHandler::new(self.events.clone())
    }

    pub fn notification_handler(&self) -> ProcessNotificationHandler {
        ProcessNotificationHandler::new(
            self.webhook_events.clone(),
            self.payments.clone(),
            self.registrations.clone(),
            self.subscriptions.clone(),
            self.ledger.clone(),
        )
    }

    pub fn treasury_handler(&self) -> TreasuryReportHandler {
        TreasuryReportHandler::new(self.treasury.clone())
    }

    pub fn sweep_handler(&self) -> ReconciliationSweepHandler {
        ReconciliationSweepHandler::new(
            self.webhook_events.clone(),
            self.payments.clone(),
            self.registrations.clone(),
            self.gateway.clone(),
            Arc::new(self.notification_handler()),
            self.webhook_retry_grace,
            self.stale_pending_after_days,
        )
    }
}
