//! REST adapter for the payment gateway.
//!
//! Implements `PaymentGateway` against the provider's HTTP API.
//!
//! # Timeouts
//!
//! Every request carries a bounded timeout. A timeout maps to
//! `GatewayErrorCode::Timeout`, which callers treat as an *unknown outcome*:
//! the resource may exist at the provider, so retries go through the
//! idempotent get-or-create paths rather than assuming failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::Money;
use crate::ports::{
    CustomerRef, GatewayCharge, GatewayChargeSummary, GatewayError, GatewaySubscriptionRef,
    NewCustomer, NewGatewayPayment, NewGatewaySubscription, PaymentGateway,
};

use super::wire::{
    ApiErrorResponse, CustomerRequest, CustomerResponse, PaymentListResponse, PaymentRequest,
    PaymentResponse, SubscriptionRequest, SubscriptionResponse,
};

/// Header carrying the API key, per the provider's documentation.
const API_KEY_HEADER: &str = "access_token";

/// Page size for charge listings.
const LIST_PAGE_SIZE: u32 = 100;

/// Gateway REST adapter configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    api_key: SecretString,
    base_url: String,
    request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            request_timeout,
        }
    }
}

/// `PaymentGateway` implementation over the provider's REST API.
pub struct HttpPaymentGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        read_response(response).await
    }

    async fn get_json<R: serde::de::DeserializeOwned>(&self, path: &str) -> Result<R, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(map_transport_error)?;
        read_response(response).await
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_customer(&self, request: NewCustomer) -> Result<CustomerRef, GatewayError> {
        let body = CustomerRequest {
            name: request.name,
            email: request.email,
            external_reference: request.member_id.to_string(),
        };
        let response: CustomerResponse = self.post_json("/v3/customers", &body).await?;
        Ok(CustomerRef { id: response.id })
    }

    async fn create_subscription(
        &self,
        request: NewGatewaySubscription,
    ) -> Result<GatewaySubscriptionRef, GatewayError> {
        let body = SubscriptionRequest {
            customer: request.customer_ref,
            billing_type: request.billing_type.as_str().to_string(),
            value: request.value.cents(),
            cycle: request.cycle.as_str().to_string(),
            next_due_date: request.next_due_date,
            external_reference: request.external_ref,
        };
        let response: SubscriptionResponse = self.post_json("/v3/subscriptions", &body).await?;
        Ok(GatewaySubscriptionRef {
            id: response.id,
            next_due_date: response.next_due_date,
        })
    }

    async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url(&format!("/v3/subscriptions/{}", subscription_ref)))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(map_status_error(response).await)
    }

    async fn create_payment(
        &self,
        request: NewGatewayPayment,
    ) -> Result<GatewayCharge, GatewayError> {
        let body = PaymentRequest {
            customer: request.customer_ref,
            billing_type: request.billing_type.as_str().to_string(),
            value: request.value.cents(),
            due_date: request.due_date,
            description: request.description,
            external_reference: request.external_ref,
        };
        let response: PaymentResponse = self.post_json("/v3/payments", &body).await?;
        Ok(GatewayCharge {
            id: response.id,
            invoice_url: response.invoice_url,
            bank_slip_url: response.bank_slip_url,
            pix_code: response.pix_code,
            due_date: response.due_date,
        })
    }

    async fn payments_by_external_ref_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<GatewayChargeSummary>, GatewayError> {
        // The provider's listing has no prefix filter; fetch the most
        // recent page and filter client-side. The sweep only needs recent
        // charges - anything older has been reconciled by earlier passes.
        let response: PaymentListResponse = self
            .get_json(&format!("/v3/payments?limit={}", LIST_PAGE_SIZE))
            .await?;

        Ok(response
            .data
            .into_iter()
            .filter(|p| {
                p.external_reference
                    .as_deref()
                    .is_some_and(|r| r.starts_with(prefix))
            })
            .map(|p| GatewayChargeSummary {
                id: p.id,
                status: p.status,
                value: Money::from_cents(p.value),
                external_ref: p.external_reference,
            })
            .collect())
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::timeout(err.to_string())
    } else {
        GatewayError::network(err.to_string())
    }
}

async fn read_response<R: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<R, GatewayError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("unreadable provider response: {}", e)));
    }
    Err(map_status_error(response).await)
}

async fn map_status_error(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body: ApiErrorResponse = response.json().await.unwrap_or(ApiErrorResponse {
        errors: Vec::new(),
    });
    let description = body.description();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::authentication(description)
        }
        StatusCode::NOT_FOUND => GatewayError::not_found("gateway resource"),
        s if s.is_client_error() => GatewayError::invalid_request(description),
        _ => GatewayError::provider(format!("{}: {}", status, description)),
    }
}
