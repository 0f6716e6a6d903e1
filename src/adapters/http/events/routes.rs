//! Router for the registration API.

use axum::routing::{delete, get, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{get_event, register, unregister};

/// Routes mounted under `/api/events`.
///
/// - `GET /{event_id}` - event details, status reconciled on read
/// - `POST /{event_id}/registrations` - register a member
/// - `DELETE /{event_id}/registrations/{member_id}` - unregister
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:event_id", get(get_event))
        .route("/:event_id/registrations", post(register))
        .route("/:event_id/registrations/:member_id", delete(unregister))
}
