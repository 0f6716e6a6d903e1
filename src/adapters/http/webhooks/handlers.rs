//! HTTP handler for inbound gateway notifications.
//!
//! Store-then-process contract: the endpoint answers 200 as soon as the
//! notification is durably stored, even when downstream dispatch fails -
//! the gateway must not keep retrying a non-retryable bug, and failed
//! dispatches are retried out-of-band by the reconciliation sweep. Only a
//! failure to *store* returns a 5xx (the gateway retries those), and only
//! an invalid signature or payload returns a 4xx.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::webhook::NotificationOutcome;
use crate::domain::webhook::WebhookError;

use super::super::state::AppState;

/// Header carrying the gateway's delivery signature.
const SIGNATURE_HEADER: &str = "x-gateway-signature";

/// POST /api/webhooks/payments
pub async fn receive_payment_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("webhook delivery rejected: missing signature header");
        return StatusCode::UNAUTHORIZED;
    };

    // Reject forged or replayed deliveries before touching the
    // idempotency store.
    let notification = match state.webhook_verifier.verify_and_parse(&body, signature) {
        Ok(notification) => notification,
        Err(WebhookError::ParseError(reason)) => {
            tracing::warn!(%reason, "webhook delivery rejected: malformed");
            return StatusCode::BAD_REQUEST;
        }
        Err(err) => {
            tracing::warn!(error = %err, "webhook delivery rejected: signature check failed");
            return StatusCode::UNAUTHORIZED;
        }
    };

    let event_id = notification.id.clone();
    match state.notification_handler().handle(notification).await {
        Ok(NotificationOutcome::Processed) => StatusCode::OK,
        Ok(NotificationOutcome::AlreadyProcessed) => {
            tracing::debug!(%event_id, "duplicate webhook delivery acknowledged");
            StatusCode::OK
        }
        // Stored; dispatch failure is logged and retried out-of-band.
        Ok(NotificationOutcome::Failed(_)) => StatusCode::OK,
        // Could not store the notification: ask the gateway to redeliver.
        Err(err) => {
            tracing::error!(%event_id, error = %err, "failed to store webhook delivery");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
