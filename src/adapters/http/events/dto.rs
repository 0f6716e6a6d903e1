//! DTOs for the registration API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::handlers::registration::{PaymentCheckout, RegistrationResult};
use crate::domain::event::{CommunityEvent, EventRegistration};

/// Request body for registering a member.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub member_id: String,
}

/// A registration as returned by the API.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub event_id: String,
    pub member_id: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&EventRegistration> for RegistrationResponse {
    fn from(registration: &EventRegistration) -> Self {
        Self {
            id: registration.id.to_string(),
            event_id: registration.event_id.to_string(),
            member_id: registration.member_id.to_string(),
            payment_status: registration.payment_status.to_string(),
            created_at: registration.created_at,
        }
    }
}

/// Checkout block returned for priced events.
#[derive(Debug, Serialize)]
pub struct PaymentCheckoutResponse {
    pub id: String,
    pub invoice_url: Option<String>,
    pub bank_slip_url: Option<String>,
    pub pix_code: Option<String>,
    /// Amount in cents.
    pub value: i64,
    pub due_date: NaiveDate,
}

impl From<PaymentCheckout> for PaymentCheckoutResponse {
    fn from(checkout: PaymentCheckout) -> Self {
        Self {
            id: checkout.gateway_payment_id,
            invoice_url: checkout.invoice_url,
            bank_slip_url: checkout.bank_slip_url,
            pix_code: checkout.pix_code,
            value: checkout.value.cents(),
            due_date: checkout.due_date,
        }
    }
}

/// Response body for a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub registration: RegistrationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentCheckoutResponse>,
}

impl From<RegistrationResult> for RegisterResponse {
    fn from(result: RegistrationResult) -> Self {
        Self {
            registration: RegistrationResponse::from(&result.registration),
            payment: result.payment.map(PaymentCheckoutResponse::from),
        }
    }
}

/// An event with its lifecycle status reconciled at read time.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub max_participants: u32,
    pub registered_participants: u32,
    /// Price in cents; 0 means free.
    pub price: i64,
    pub status: String,
}

impl From<CommunityEvent> for EventResponse {
    fn from(event: CommunityEvent) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            max_participants: event.max_participants,
            registered_participants: event.registered_participants,
            price: event.price.cents(),
            status: event.status.to_string(),
        }
    }
}
