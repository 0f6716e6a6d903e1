//! HTTP adapters (axum).
//!
//! Route areas:
//!
//! - `events` - registration API (consumed by the web layer)
//! - `billing` - subscription API and the treasury read model
//! - `webhooks` - the gateway's inbound notification endpoint
//!
//! Callers of the events/billing routes arrive as already-authenticated
//! member ids; the webhook route authenticates by signature instead.

mod billing;
mod error;
mod events;
mod state;
mod webhooks;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::Router;

/// The complete API router, to be mounted at `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/events", events::routes())
        .nest("/members", billing::member_routes())
        .nest("/treasury", billing::treasury_routes())
        .nest("/webhooks", webhooks::routes())
}
