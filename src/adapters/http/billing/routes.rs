//! Routers for the subscription and treasury APIs.

use axum::routing::{get, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{activate_subscription, cancel_subscription, treasury_report};

/// Routes mounted under `/api/members`.
///
/// - `POST /{member_id}/subscription` - activate dues
/// - `DELETE /{member_id}/subscription` - cancel dues
pub fn member_routes() -> Router<AppState> {
    Router::new().route(
        "/:member_id/subscription",
        post(activate_subscription).delete(cancel_subscription),
    )
}

/// Routes mounted under `/api/treasury` (admin).
///
/// - `GET /report` - collection rate and ledger totals
pub fn treasury_routes() -> Router<AppState> {
    Router::new().route("/report", get(treasury_report))
}
