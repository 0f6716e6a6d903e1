//! Router for the gateway webhook endpoint.
//!
//! Separate from the member-facing routes: deliveries are authenticated by
//! signature, not by caller identity.

use axum::routing::post;
use axum::Router;

use super::super::state::AppState;
use super::handlers::receive_payment_notification;

/// Routes mounted under `/api/webhooks`.
///
/// - `POST /payments` - inbound gateway notifications
pub fn routes() -> Router<AppState> {
    Router::new().route("/payments", post(receive_payment_notification))
}
