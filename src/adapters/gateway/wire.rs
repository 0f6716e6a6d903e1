//! Wire DTOs for the gateway REST API.
//!
//! Monetary amounts are integer cents throughout, matching the provider's
//! API contract. Field names are camelCase on the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CustomerRequest {
    pub name: String,
    pub email: String,
    /// Internal member id, stored as provider metadata.
    pub external_reference: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CustomerResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubscriptionRequest {
    pub customer: String,
    pub billing_type: String,
    pub value: i64,
    pub cycle: String,
    pub next_due_date: NaiveDate,
    pub external_reference: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubscriptionResponse {
    pub id: String,
    pub next_due_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentRequest {
    pub customer: String,
    pub billing_type: String,
    pub value: i64,
    pub due_date: NaiveDate,
    pub description: String,
    pub external_reference: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentResponse {
    pub id: String,
    #[serde(default)]
    pub invoice_url: Option<String>,
    #[serde(default)]
    pub bank_slip_url: Option<String>,
    #[serde(default)]
    pub pix_code: Option<String>,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentSummaryResponse {
    pub id: String,
    pub status: String,
    pub value: i64,
    #[serde(default)]
    pub external_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PaymentListResponse {
    pub data: Vec<PaymentSummaryResponse>,
}

/// Error body the provider returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorEntry {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl ApiErrorResponse {
    /// First human-readable description, or a fallback.
    pub fn description(&self) -> String {
        self.errors
            .first()
            .map(|e| {
                if e.code.is_empty() {
                    e.description.clone()
                } else {
                    format!("{}: {}", e.code, e.description)
                }
            })
            .unwrap_or_else(|| "unspecified provider error".to_string())
    }
}
