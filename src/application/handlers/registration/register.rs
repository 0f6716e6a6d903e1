//! RegisterForEventHandler - command handler for event registration.
//!
//! Free events insert a registration directly. Priced events first ensure
//! the member exists as a gateway customer (idempotently), create a one-off
//! charge, then commit the registration, charge mirror, and pending income
//! ledger entry in one transaction. The authoritative capacity/status check
//! happens inside that transaction; the prechecks here only fail fast.
//!
//! If the local commit fails after the gateway charge was created, the
//! charge is orphaned at the gateway; the reconciliation sweep detects it by
//! external reference, so a charged-but-unregistered member is never
//! silently lost.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use crate::domain::event::EventRegistration;
use crate::domain::foundation::{DomainError, ErrorCode, EventId, MemberId, Money};
use crate::domain::ledger::LedgerEntry;
use crate::domain::member::Member;
use crate::domain::payment::{BillingType, ExternalRef, PaymentRecord};
use crate::ports::{
    EventRepository, GatewayCharge, MemberRepository, NewCustomer, NewGatewayPayment,
    NewPaidRegistration, PaymentGateway, RegistrationDenial, RegistrationInsert, RegistrationStore,
};

/// Days the payer has to settle an event charge.
pub const PAYMENT_DUE_DAYS: i64 = 7;

/// Command to register a member for an event.
#[derive(Debug, Clone)]
pub struct RegisterForEventCommand {
    pub event_id: EventId,
    pub member_id: MemberId,
}

/// Checkout information for a paid registration, passed back to the caller
/// so payment can be completed out of band.
#[derive(Debug, Clone)]
pub struct PaymentCheckout {
    pub gateway_payment_id: String,
    pub invoice_url: Option<String>,
    pub bank_slip_url: Option<String>,
    pub pix_code: Option<String>,
    pub value: Money,
    pub due_date: NaiveDate,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    pub registration: EventRegistration,
    /// Present only for priced events.
    pub payment: Option<PaymentCheckout>,
}

/// Handler for event registration.
pub struct RegisterForEventHandler {
    members: Arc<dyn MemberRepository>,
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl RegisterForEventHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            members,
            events,
            registrations,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterForEventCommand,
    ) -> Result<RegistrationResult, DomainError> {
        let member = self
            .members
            .find_by_id(&cmd.member_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))?;

        let event = self
            .events
            .find_by_id(&cmd.event_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::EventNotFound, "Event not found"))?;

        // Fast-path denials; the store repeats these checks inside the
        // insert transaction.
        if !event.status.accepts_registrations() {
            return Err(denial_to_error(RegistrationDenial::Closed(event.status)));
        }
        if event.is_full() {
            return Err(denial_to_error(RegistrationDenial::Full));
        }
        if self
            .registrations
            .find(&cmd.event_id, &cmd.member_id)
            .await?
            .is_some()
        {
            return Err(denial_to_error(RegistrationDenial::AlreadyRegistered));
        }

        if event.is_free() {
            return match self
                .registrations
                .insert(&cmd.event_id, &cmd.member_id, None)
                .await?
            {
                RegistrationInsert::Inserted(registration) => Ok(RegistrationResult {
                    registration,
                    payment: None,
                }),
                RegistrationInsert::Denied(denial) => Err(denial_to_error(denial)),
            };
        }

        // Paid path: gateway customer, then the charge, then the atomic
        // local commit.
        let customer_ref = self.ensure_gateway_customer(&member).await?;
        let external_ref = ExternalRef::for_event(cmd.event_id, cmd.member_id);
        let due_date = (Utc::now() + Duration::days(PAYMENT_DUE_DAYS)).date_naive();

        let charge = self
            .gateway
            .create_payment(NewGatewayPayment {
                customer_ref,
                billing_type: BillingType::Undefined,
                value: event.price,
                due_date,
                description: format!("Event registration: {}", event.title),
                external_ref: external_ref.to_string(),
            })
            .await?;

        let paid = NewPaidRegistration {
            payment: PaymentRecord::pending(
                charge.id.clone(),
                event.price,
                BillingType::Undefined,
                charge.due_date,
                Some(external_ref.to_string()),
            ),
            ledger_entry: LedgerEntry::pending_income(
                format!("Event registration: {}", event.title),
                event.price,
                Utc::now().date_naive(),
                LedgerEntry::CATEGORY_EVENT_REGISTRATIONS,
                charge.id.clone(),
            ),
        };

        match self
            .registrations
            .insert(&cmd.event_id, &cmd.member_id, Some(paid))
            .await?
        {
            RegistrationInsert::Inserted(registration) => Ok(RegistrationResult {
                registration,
                payment: Some(checkout_from_charge(charge, event.price)),
            }),
            RegistrationInsert::Denied(denial) => {
                // The gateway charge now has no local registration; the
                // reconciliation sweep will surface it by external ref.
                tracing::warn!(
                    gateway_payment_id = %charge.id,
                    external_ref = %external_ref,
                    "registration denied after gateway charge was created"
                );
                Err(denial_to_error(denial))
            }
        }
    }

    /// Get-or-create the member's gateway customer.
    ///
    /// The mapping is persisted immediately after a successful gateway call,
    /// before any other write, so a retry after a timeout or crash finds it
    /// instead of creating a duplicate customer.
    async fn ensure_gateway_customer(&self, member: &Member) -> Result<String, DomainError> {
        if let Some(existing) = &member.gateway_customer_id {
            return Ok(existing.clone());
        }

        let customer = self
            .gateway
            .create_customer(NewCustomer {
                member_id: member.id,
                name: member.full_name.clone(),
                email: member.email.clone(),
            })
            .await?;

        self.members
            .set_gateway_customer(&member.id, &customer.id)
            .await?;

        Ok(customer.id)
    }
}

fn checkout_from_charge(charge: GatewayCharge, value: Money) -> PaymentCheckout {
    PaymentCheckout {
        gateway_payment_id: charge.id,
        invoice_url: charge.invoice_url,
        bank_slip_url: charge.bank_slip_url,
        pix_code: charge.pix_code,
        value,
        due_date: charge.due_date,
    }
}

pub(crate) fn denial_to_error(denial: RegistrationDenial) -> DomainError {
    match denial {
        RegistrationDenial::AlreadyRegistered => DomainError::new(
            ErrorCode::AlreadyRegistered,
            "Member is already registered for this event",
        ),
        RegistrationDenial::Closed(status) => DomainError::new(
            ErrorCode::RegistrationClosed,
            format!("Event is not accepting registrations (status: {})", status),
        ),
        RegistrationDenial::Full => {
            DomainError::new(ErrorCode::EventFull, "Event has reached its capacity")
        }
    }
}
