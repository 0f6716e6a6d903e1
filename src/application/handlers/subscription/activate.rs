//! ActivateDuesSubscriptionHandler - command handler for starting dues.
//!
//! Eligibility is gated by rank; the local ACTIVE row is persisted only
//! after the gateway subscription exists. Customer provisioning is
//! idempotent so the whole call is safe to retry after a gateway timeout.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Money};
use crate::domain::member::Member;
use crate::domain::payment::{BillingCycle, BillingType, ExternalRef};
use crate::domain::subscription::DuesSubscription;
use crate::ports::{
    MemberRepository, NewCustomer, NewGatewaySubscription, PaymentGateway, SubscriptionRepository,
};

/// Days until the first dues installment is due.
pub const FIRST_DUE_DAYS: i64 = 30;

/// Command to activate a member's dues subscription.
#[derive(Debug, Clone)]
pub struct ActivateDuesSubscriptionCommand {
    pub member_id: MemberId,
    pub billing_type: BillingType,
}

/// Handler for dues activation.
pub struct ActivateDuesSubscriptionHandler {
    members: Arc<dyn MemberRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    /// Monthly dues value, fixed by policy (configuration).
    dues_value: Money,
}

impl ActivateDuesSubscriptionHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        dues_value: Money,
    ) -> Self {
        Self {
            members,
            subscriptions,
            gateway,
            dues_value,
        }
    }

    pub async fn handle(
        &self,
        cmd: ActivateDuesSubscriptionCommand,
    ) -> Result<DuesSubscription, DomainError> {
        let member = self
            .members
            .find_by_id(&cmd.member_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))?;

        if !member.rank.is_payment_eligible() {
            return Err(DomainError::new(
                ErrorCode::NotEligible,
                format!("Rank {} is not billed dues", member.rank),
            ));
        }

        if self
            .subscriptions
            .find_active_by_member(&cmd.member_id)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::AlreadySubscribed,
                "Member already has an active dues subscription",
            ));
        }

        let customer_ref = self.ensure_gateway_customer(&member).await?;
        let next_due_date = (Utc::now() + Duration::days(FIRST_DUE_DAYS)).date_naive();

        let gateway_subscription = self
            .gateway
            .create_subscription(NewGatewaySubscription {
                customer_ref,
                billing_type: cmd.billing_type,
                value: self.dues_value,
                cycle: BillingCycle::Monthly,
                next_due_date,
                external_ref: ExternalRef::for_dues(cmd.member_id).to_string(),
            })
            .await?;

        let subscription = DuesSubscription::activate(
            cmd.member_id,
            gateway_subscription.id.clone(),
            BillingCycle::Monthly,
            self.dues_value,
            gateway_subscription.next_due_date,
        );

        if let Err(err) = self.subscriptions.insert(&subscription).await {
            if err.code == ErrorCode::AlreadySubscribed {
                // A concurrent activation won the partial-unique-index race.
                // Best effort: undo the losing gateway subscription so the
                // member is not billed twice.
                if let Err(cancel_err) = self
                    .gateway
                    .cancel_subscription(&gateway_subscription.id)
                    .await
                {
                    tracing::warn!(
                        gateway_subscription_id = %gateway_subscription.id,
                        error = %cancel_err,
                        "failed to cancel losing gateway subscription after activation race"
                    );
                }
            }
            return Err(err);
        }

        Ok(subscription)
    }

    /// Get-or-create the member's gateway customer; the mapping is written
    /// immediately after gateway success so retries never duplicate the
    /// customer.
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
