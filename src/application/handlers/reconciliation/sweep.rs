//! ReconciliationSweepHandler - periodic consistency sweep.
//!
//! Gateway calls and local writes are not transactional with each other, so
//! the sweep closes the gaps the request path cannot:
//!
//! 1. **Webhook retry**: unprocessed notification rows (dispatch failed, or
//!    a crash hit between claim and completion) are re-dispatched. Dispatch
//!    is idempotent, so re-entry is safe.
//! 2. **Orphaned charges**: gateway charges whose external reference names
//!    a registration that does not exist locally mean the local commit
//!    failed after the gateway call. These are reported, never dropped.
//! 3. **Stale pending charges**: local charges still pending well past
//!    their due date (an unregistered member's abandoned charge, or a
//!    missed webhook) are flagged for manual follow-up. Nothing is
//!    auto-cancelled.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::foundation::DomainError;
use crate::domain::payment::ExternalRef;
use crate::domain::webhook::GatewayNotification;
use crate::ports::{PaymentGateway, PaymentRepository, RegistrationStore, WebhookEventRepository};

use crate::application::handlers::webhook::{NotificationOutcome, ProcessNotificationHandler};

/// Maximum unprocessed rows re-dispatched per sweep.
const RETRY_BATCH_LIMIT: u32 = 100;

/// A gateway charge with no matching local registration.
#[derive(Debug, Clone)]
pub struct OrphanedCharge {
    pub gateway_payment_id: String,
    pub external_ref: String,
}

/// What one sweep pass found and did.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Unprocessed notifications re-dispatched.
    pub retried: u32,
    /// Of those, how many completed this pass.
    pub recovered: u32,
    /// Charges at the gateway with no local registration.
    pub orphaned_charges: Vec<OrphanedCharge>,
    /// Gateway payment ids of local charges pending past the grace period.
    pub stale_pending: Vec<String>,
}

/// Handler running one consistency sweep.
pub struct ReconciliationSweepHandler {
    webhook_events: Arc<dyn WebhookEventRepository>,
    payments: Arc<dyn PaymentRepository>,
    registrations: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn PaymentGateway>,
    processor: Arc<ProcessNotificationHandler>,
    /// Unprocessed rows younger than this are left for the ordinary retry
    /// path (the gateway redelivers on its own).
    retry_grace: Duration,
    /// Days past due before a pending charge counts as stale.
    stale_after_days: i64,
}

impl ReconciliationSweepHandler {
    pub fn new(
        webhook_events: Arc<dyn WebhookEventRepository>,
        payments: Arc<dyn PaymentRepository>,
        registrations: Arc<dyn RegistrationStore>,
        gateway: Arc<dyn PaymentGateway>,
        processor: Arc<ProcessNotificationHandler>,
        retry_grace: Duration,
        stale_after_days: i64,
    ) -> Self {
        Self {
            webhook_events,
            payments,
            registrations,
            gateway,
            processor,
            retry_grace,
            stale_after_days,
        }
    }

    pub async fn handle(&self, now: DateTime<Utc>) -> Result<SweepReport, DomainError> {
        let mut report = SweepReport::default();

        self.retry_unprocessed(now, &mut report).await?;
        self.detect_orphaned_charges(&mut report).await?;
        self.flag_stale_pending(now, &mut report).await?;

        if !report.orphaned_charges.is_empty() || !report.stale_pending.is_empty() {
            tracing::error!(
                orphaned = report.orphaned_charges.len(),
                stale_pending = report.stale_pending.len(),
                "reconciliation sweep found inconsistencies requiring manual follow-up"
            );
        }

        Ok(report)
    }

    async fn retry_unprocessed(
        &self,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Result<(), DomainError> {
        let cutoff = now - self.retry_grace;
        let stored = self
            .webhook_events
            .find_unprocessed(cutoff, RETRY_BATCH_LIMIT)
            .await?;

        for row in stored {
            report.retried += 1;
            let notification: GatewayNotification =
                match serde_json::from_value(row.payload.clone()) {
                    Ok(n) => n,
                    Err(e) => {
                        self.webhook_events
                            .record_failure(&row.event_id, &format!("unreadable payload: {}", e))
                            .await?;
                        continue;
                    }
                };

            match self.processor.handle(notification).await? {
                NotificationOutcome::Processed | NotificationOutcome::AlreadyProcessed => {
                    report.recovered += 1;
                }
                NotificationOutcome::Failed(_) => {
                    // Failure already recorded on the row; next sweep retries.
                }
            }
        }

        Ok(())
    }

    /// Compare gateway charges against local registrations, keyed by
    /// external reference.
    async fn detect_orphaned_charges(&self, report: &mut SweepReport) -> Result<(), DomainError> {
        let charges = self
            .gateway
            .payments_by_external_ref_prefix(ExternalRef::EVENT_PREFIX)
            .await?;

        for charge in charges {
            let Some(reference) = charge.external_ref.as_deref() else {
                continue;
            };
            let Some(ExternalRef::Event { event_id, member_id }) = ExternalRef::parse(reference)
            else {
                continue;
            };

            if self.registrations.find(&event_id, &member_id).await?.is_none() {
                tracing::error!(
                    gateway_payment_id = %charge.id,
                    external_ref = reference,
                    "gateway charge has no local registration (charged-but-unregistered)"
                );
                report.orphaned_charges.push(OrphanedCharge {
                    gateway_payment_id: charge.id,
                    external_ref: reference.to_string(),
                });
            }
        }

        Ok(())
    }

    async fn flag_stale_pending(
        &self,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Result<(), DomainError> {
        let cutoff = (now - Duration::days(self.stale_after_days)).date_naive();
        let stale = self.payments.find_stale_pending(cutoff).await?;

        for record in stale {
            tracing::warn!(
                gateway_payment_id = %record.gateway_id,
                due_date = %record.due_date,
                "charge still pending past the grace period"
            );
            report.stale_pending.push(record.gateway_id);
        }

        Ok(())
    }
}
