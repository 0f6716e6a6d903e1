//! CancelDuesSubscriptionHandler - command handler for stopping dues.
//!
//! The gateway cancellation runs first; local state flips to CANCELLED only
//! after the gateway confirms. A gateway failure leaves the local row
//! ACTIVE, so the states can only diverge in the retry-safe direction
//! (still active locally, already cancelled remotely - the next attempt
//! converges).

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::{PaymentGateway, SubscriptionRepository};

/// Command to cancel a member's dues subscription.
#[derive(Debug, Clone)]
pub struct CancelDuesSubscriptionCommand {
    pub member_id: MemberId,
}

/// Handler for dues cancellation.
pub struct CancelDuesSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CancelDuesSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            subscriptions,
            gateway,
        }
    }

    pub async fn handle(&self, cmd: CancelDuesSubscriptionCommand) -> Result<(), DomainError> {
        let subscription = self
            .subscriptions
            .find_active_by_member(&cmd.member_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::NotSubscribed,
                    "Member has no active dues subscription",
                )
            })?;

        // Gateway first. If this fails the local row stays ACTIVE and the
        // caller retries the whole operation.
        self.gateway
            .cancel_subscription(&subscription.gateway_subscription_id)
            .await?;

        self.subscriptions
            .set_status(&subscription.id, SubscriptionStatus::Cancelled)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, SubscriptionId};
    use crate::domain::payment::BillingCycle;
    use crate::domain::subscription::DuesSubscription;
    use crate::ports::{
        CustomerRef, GatewayCharge, GatewayChargeSummary, GatewayError, GatewaySubscriptionRef,
        NewCustomer, NewGatewayPayment, NewGatewaySubscription,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSubscriptionRepository {
        active: Mutex<Option<DuesSubscription>>,
        status_writes: Mutex<Vec<(SubscriptionId, SubscriptionStatus)>>,
    }

    impl MockSubscriptionRepository {
        fn with_active(subscription: DuesSubscription) -> Self {
            Self {
                active: Mutex::new(Some(subscription)),
                ..Default::default()
            }
        }

        fn status_writes(&self) -> Vec<(SubscriptionId, SubscriptionStatus)> {
            self.status_writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn insert(&self, _subscription: &DuesSubscription) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_active_by_member(
            &self,
            member_id: &MemberId,
        ) -> Result<Option<DuesSubscription>, DomainError> {
            Ok(self
                .active
                .lock()
                .unwrap()
                .clone()
                .filter(|s| &s.member_id == member_id))
        }

        async fn set_status(
            &self,
            id: &SubscriptionId,
            status: SubscriptionStatus,
        ) -> Result<bool, DomainError> {
            self.status_writes.lock().unwrap().push((*id, status));
            Ok(true)
        }

        async fn advance_next_due(
            &self,
            _id: &SubscriptionId,
            _next_due_date: NaiveDate,
        ) -> Result<bool, DomainError> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct MockPaymentGateway {
        cancelled: Mutex<Vec<String>>,
        fail_cancel: bool,
    }

    impl MockPaymentGateway {
        fn failing_cancel() -> Self {
            Self {
                fail_cancel: true,
                ..Default::default()
            }
        }

        fn cancelled(&self) -> Vec<String> {
            self.cancelled.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockPaymentGateway {
        async fn create_customer(
            &self,
            _request: NewCustomer,
        ) -> Result<CustomerRef, GatewayError> {
            Ok(CustomerRef {
                id: "cus_1".to_string(),
            })
        }

        async fn create_subscription(
            &self,
            request: NewGatewaySubscription,
        ) -> Result<GatewaySubscriptionRef, GatewayError> {
            Ok(GatewaySubscriptionRef {
                id: "sub_1".to_string(),
                next_due_date: request.next_due_date,
            })
        }

        async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError> {
            if self.fail_cancel {
                return Err(GatewayError::timeout("deadline exceeded"));
            }
            self.cancelled
                .lock()
                .unwrap()
                .push(subscription_ref.to_string());
            Ok(())
        }

        async fn create_payment(
            &self,
            _request: NewGatewayPayment,
        ) -> Result<GatewayCharge, GatewayError> {
            Err(GatewayError::provider("not used in these tests"))
        }

        async fn payments_by_external_ref_prefix(
            &self,
            _prefix: &str,
        ) -> Result<Vec<GatewayChargeSummary>, GatewayError> {
            Ok(vec![])
        }
    }

    fn active_subscription(member_id: MemberId) -> DuesSubscription {
        DuesSubscription::activate(
            member_id,
            "sub_gw_1",
            BillingCycle::Monthly,
            Money::from_cents(5000),
            NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
        )
    }

    #[tokio::test]
    async fn cancellation_hits_gateway_then_local_state() {
        let member_id = MemberId::new();
        let subscription = active_subscription(member_id);
        let subscriptions = Arc::new(MockSubscriptionRepository::with_active(subscription.clone()));
        let gateway = Arc::new(MockPaymentGateway::default());
        let handler = CancelDuesSubscriptionHandler::new(subscriptions.clone(), gateway.clone());

        handler
            .handle(CancelDuesSubscriptionCommand { member_id })
            .await
            .unwrap();

        assert_eq!(gateway.cancelled(), vec!["sub_gw_1".to_string()]);
        assert_eq!(
            subscriptions.status_writes(),
            vec![(subscription.id, SubscriptionStatus::Cancelled)]
        );
    }

    #[tokio::test]
    async fn gateway_failure_keeps_local_state_active() {
        let member_id = MemberId::new();
        let subscriptions = Arc::new(MockSubscriptionRepository::with_active(
            active_subscription(member_id),
        ));
        let handler = CancelDuesSubscriptionHandler::new(
            subscriptions.clone(),
            Arc::new(MockPaymentGateway::failing_cancel()),
        );

        let err = handler
            .handle(CancelDuesSubscriptionCommand { member_id })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::GatewayUnavailable);
        assert!(subscriptions.status_writes().is_empty());
    }

    #[tokio::test]
    async fn cancelling_without_a_subscription_fails() {
        let handler = CancelDuesSubscriptionHandler::new(
            Arc::new(MockSubscriptionRepository::default()),
            Arc::new(MockPaymentGateway::default()),
        );

        let err = handler
            .handle(CancelDuesSubscriptionCommand {
                member_id: MemberId::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotSubscribed);
    }
}
