//! In-memory payment gateway for tests and local development.
//!
//! Deterministic ids, inspectable state, optional failure injection.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{
    CustomerRef, GatewayCharge, GatewayChargeSummary, GatewayError, GatewaySubscriptionRef,
    NewCustomer, NewGatewayPayment, NewGatewaySubscription, PaymentGateway,
};

/// Deterministic in-memory `PaymentGateway`.
#[derive(Default)]
pub struct MockPaymentGateway {
    counter: AtomicU32,
    customers: Mutex<Vec<NewCustomer>>,
    subscriptions: Mutex<Vec<(String, NewGatewaySubscription)>>,
    cancelled_subscriptions: Mutex<Vec<String>>,
    payments: Mutex<Vec<(String, NewGatewayPayment)>>,
    fail_next: AtomicBool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next gateway call fail with a provider error.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// All charges created, in order.
    pub fn created_payments(&self) -> Vec<NewGatewayPayment> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// All customers created, in order.
    pub fn created_customers(&self) -> Vec<NewCustomer> {
        self.customers.lock().unwrap().clone()
    }

    /// Gateway subscription ids cancelled, in order.
    pub fn cancelled_subscriptions(&self) -> Vec<String> {
        self.cancelled_subscriptions.lock().unwrap().clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}_{}", prefix, n)
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::provider("injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_customer(&self, request: NewCustomer) -> Result<CustomerRef, GatewayError> {
        self.check_failure()?;
        let id = self.next_id("cus");
        self.customers.lock().unwrap().push(request);
        Ok(CustomerRef { id })
    }

    async fn create_subscription(
        &self,
        request: NewGatewaySubscription,
    ) -> Result<GatewaySubscriptionRef, GatewayError> {
        self.check_failure()?;
        let id = self.next_id("sub");
        let next_due_date = request.next_due_date;
        self.subscriptions
            .lock()
            .unwrap()
            .push((id.clone(), request));
        Ok(GatewaySubscriptionRef { id, next_due_date })
    }

    async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError> {
        self.check_failure()?;
        let exists = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .any(|(id, _)| id == subscription_ref);
        if !exists {
            return Err(GatewayError::not_found("subscription"));
        }
        self.cancelled_subscriptions
            .lock()
            .unwrap()
            .push(subscription_ref.to_string());
        Ok(())
    }

    async fn create_payment(
        &self,
        request: NewGatewayPayment,
    ) -> Result<GatewayCharge, GatewayError> {
        self.check_failure()?;
        let id = self.next_id("pay");
        let due_date = request.due_date;
        self.payments.lock().unwrap().push((id.clone(), request));
        Ok(GatewayCharge {
            invoice_url: Some(format!("https://gateway.test/i/{}", id)),
            bank_slip_url: Some(format!("https://gateway.test/b/{}", id)),
            pix_code: Some(format!("00020126PIX{}", id)),
            id,
            due_date,
        })
    }

    async fn payments_by_external_ref_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<GatewayChargeSummary>, GatewayError> {
        self.check_failure()?;
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| p.external_ref.starts_with(prefix))
            .map(|(id, p)| GatewayChargeSummary {
                id: id.clone(),
                status: "PENDING".to_string(),
                value: p.value,
                external_ref: Some(p.external_ref.clone()),
            })
            .collect())
    }
}
