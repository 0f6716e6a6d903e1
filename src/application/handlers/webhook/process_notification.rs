//! ProcessNotificationHandler - applies gateway notifications exactly once.
//!
//! ## Store-then-process
//!
//! 1. Claim: the notification is stored unprocessed in its own transaction,
//!    keyed by the gateway event id. A duplicate of a fully-processed event
//!    returns immediately; a redelivery of a stored-but-unprocessed event
//!    re-enters dispatch.
//! 2. Dispatch on the event type. Every step is an idempotent upsert, so
//!    re-entry after a crash and out-of-order delivery both converge:
//!    RECEIVED arriving before CREATED materializes the mirror row itself,
//!    and re-applying a terminal status is a no-op.
//! 3. Mark processed only after dispatch succeeds. A dispatch failure is
//!    recorded on the row and retried out-of-band; the HTTP layer has
//!    already acknowledged the delivery at storage time.
//!
//! A notification referencing local state that does not exist is a
//! consistency error: logged, recorded on the row, never silently dropped.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::payment::{ExternalRef, PaymentStatus};
use crate::domain::webhook::{GatewayEventKind, GatewayNotification};
use crate::ports::{
    ClaimOutcome, LedgerStore, PaymentRepository, RegistrationStore, SubscriptionRepository,
    WebhookEventRepository,
};

/// Outcome of handling one inbound notification.
#[derive(Debug)]
pub enum NotificationOutcome {
    /// Dispatched and marked processed.
    Processed,

    /// Duplicate of an already-processed event; nothing was done.
    AlreadyProcessed,

    /// Stored, but dispatch failed; the row stays unprocessed for
    /// out-of-band retry. The delivery itself was still acknowledged.
    Failed(DomainError),
}

/// Handler applying gateway notifications to local state.
pub struct ProcessNotificationHandler {
    webhook_events: Arc<dyn WebhookEventRepository>,
    payments: Arc<dyn PaymentRepository>,
    registrations: Arc<dyn RegistrationStore>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    ledger: Arc<dyn LedgerStore>,
}

impl ProcessNotificationHandler {
    pub fn new(
        webhook_events: Arc<dyn WebhookEventRepository>,
        payments: Arc<dyn PaymentRepository>,
        registrations: Arc<dyn RegistrationStore>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            webhook_events,
            payments,
            registrations,
            subscriptions,
            ledger,
        }
    }

    /// Applies one notification exactly once.
    ///
    /// Returns an error only when the claim itself cannot be stored; every
    /// later failure is reported through `NotificationOutcome::Failed`.
    pub async fn handle(
        &self,
        notification: GatewayNotification,
    ) -> Result<NotificationOutcome, DomainError> {
        let payload = serde_json::to_value(&notification).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize notification: {}", e),
            )
        })?;

        match self
            .webhook_events
            .claim(&notification.id, &notification.event_type, payload)
            .await?
        {
            ClaimOutcome::AlreadyProcessed => return Ok(NotificationOutcome::AlreadyProcessed),
            ClaimOutcome::Claimed => {}
            ClaimOutcome::Redelivery => {
                tracing::info!(
                    event_id = %notification.id,
                    "re-dispatching previously stored notification"
                );
            }
        }

        match self.dispatch(&notification).await {
            Ok(()) => {
                self.webhook_events.mark_processed(&notification.id).await?;
                Ok(NotificationOutcome::Processed)
            }
            Err(err) => {
                tracing::error!(
                    event_id = %notification.id,
                    event_type = %notification.event_type,
                    error = %err,
                    "notification dispatch failed; left unprocessed for retry"
                );
                self.webhook_events
                    .record_failure(&notification.id, &err.to_string())
                    .await?;
                Ok(NotificationOutcome::Failed(err))
            }
        }
    }

    async fn dispatch(&self, notification: &GatewayNotification) -> Result<(), DomainError> {
        match notification.kind() {
            GatewayEventKind::PaymentCreated => self.apply_created(notification).await,
            GatewayEventKind::PaymentConfirmed => {
                self.apply_success(notification, PaymentStatus::Confirmed).await
            }
            GatewayEventKind::PaymentReceived => {
                self.apply_success(notification, PaymentStatus::Received).await
            }
            GatewayEventKind::PaymentOverdue => self.apply_overdue(notification).await,
            GatewayEventKind::PaymentCancelled => self.apply_cancelled(notification).await,
            GatewayEventKind::Unknown(kind) => {
                // Acknowledged and recorded; there is nothing to apply.
                tracing::debug!(event_id = %notification.id, kind = %kind, "ignoring unknown event type");
                Ok(())
            }
        }
    }

    /// PAYMENT_CREATED: materialize the mirror at PENDING. If the row
    /// already exists (a later event arrived first) the stored status wins.
    async fn apply_created(&self, notification: &GatewayNotification) -> Result<(), DomainError> {
        let record = notification.payment.to_record(PaymentStatus::Pending);
        self.payments.insert(&record).await?;
        Ok(())
    }

    /// PAYMENT_CONFIRMED / PAYMENT_RECEIVED: advance the mirror and
    /// propagate into the correlated registration, ledger entry, or
    /// subscription.
    async fn apply_success(
        &self,
        notification: &GatewayNotification,
        status: PaymentStatus,
    ) -> Result<(), DomainError> {
        self.upsert_mirror_at(notification, status).await?;

        let Some(external_ref) = self.correlation(notification) else {
            return Ok(());
        };

        match external_ref {
            ExternalRef::Event { event_id, member_id } => {
                let amount = Money::from_cents(notification.payment.value);
                let updated = self
                    .registrations
                    .mark_paid(&event_id, &member_id, amount)
                    .await?;
                if !updated {
                    return Err(DomainError::consistency(format!(
                        "Payment {} references unknown registration ({}, {})",
                        notification.payment.id, event_id, member_id
                    )));
                }

                if status.is_settled() {
                    let settled_on = notification
                        .payment
                        .payment_date
                        .unwrap_or_else(|| chrono::Utc::now().date_naive());
                    self.ledger
                        .settle_by_payment(
                            &notification.payment.id,
                            notification.payment.parsed_billing_type(),
                            settled_on,
                        )
                        .await?;
                }
            }
            ExternalRef::Dues { member_id } => {
                // Installment settled: push the next due date one cycle out.
                if status.is_settled() {
                    if let Some(subscription) =
                        self.subscriptions.find_active_by_member(&member_id).await?
                    {
                        let paid_on = notification
                            .payment
                            .payment_date
                            .or(notification.payment.due_date)
                            .unwrap_or(subscription.next_due_date);
                        let next = subscription.due_date_after(paid_on);
                        self.subscriptions
                            .advance_next_due(&subscription.id, next)
                            .await?;
                    } else {
                        return Err(DomainError::consistency(format!(
                            "Dues payment {} references member {} with no active subscription",
                            notification.payment.id, member_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// PAYMENT_OVERDUE: advance the mirror; a dues installment going
    /// overdue expires the subscription (gateway-reported expiry).
    async fn apply_overdue(&self, notification: &GatewayNotification) -> Result<(), DomainError> {
        self.upsert_mirror_at(notification, PaymentStatus::Overdue).await?;

        if let Some(ExternalRef::Dues { member_id }) = self.correlation(notification) {
            if let Some(subscription) =
                self.subscriptions.find_active_by_member(&member_id).await?
            {
                self.subscriptions
                    .set_status(
                        &subscription.id,
                        crate::domain::subscription::SubscriptionStatus::Expired,
                    )
                    .await?;
            }
        }

        Ok(())
    }

    /// PAYMENT_CANCELLED: advance the mirror; a correlated registration is
    /// cancelled (releasing its seat) and its ledger entry voided.
    async fn apply_cancelled(
        &self,
        notification: &GatewayNotification,
    ) -> Result<(), DomainError> {
        self.upsert_mirror_at(notification, PaymentStatus::Cancelled).await?;

        if let Some(ExternalRef::Event { event_id, member_id }) = self.correlation(notification) {
            let cancelled = self
                .registrations
                .cancel_and_release_seat(&event_id, &member_id)
                .await?;
            if !cancelled {
                return Err(DomainError::consistency(format!(
                    "Cancelled payment {} references unknown registration ({}, {})",
                    notification.payment.id, event_id, member_id
                )));
            }
            self.ledger.void_by_payment(&notification.payment.id).await?;
        }

        Ok(())
    }

    /// Upsert-not-update: advance an existing mirror row, or materialize it
    /// from the payload when the CREATED event never arrived.
    async fn upsert_mirror_at(
        &self,
        notification: &GatewayNotification,
        status: PaymentStatus,
    ) -> Result<(), DomainError> {
        let payment = &notification.payment;
        let net_value = payment.net_value.map(Money::from_cents);

        if self.payments.find(&payment.id).await?.is_none() {
            let record = payment.to_record(status);
            if self.payments.insert(&record).await? {
                return Ok(());
            }
            // Lost an insert race with a concurrent delivery; fall through
            // and advance the winner's row.
        }

        self.payments
            .advance_status(&payment.id, status, payment.payment_date, net_value)
            .await?;
        Ok(())
    }

    /// The notification's typed correlation, if it refers to this system.
    fn correlation(&self, notification: &GatewayNotification) -> Option<ExternalRef> {
        notification
            .payment
            .external_reference
            .as_deref()
            .and_then(ExternalRef::parse)
    }
}
