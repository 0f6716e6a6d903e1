//! HTTP handlers for the registration API.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use crate::application::handlers::registration::{
    RegisterForEventCommand, UnregisterFromEventCommand,
};
use crate::domain::foundation::{DomainError, EventId, MemberId};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{EventResponse, RegisterRequest, RegisterResponse};

fn parse_event_id(raw: &str) -> Result<EventId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(DomainError::validation("event_id", "Malformed event id")))
}

fn parse_member_id(raw: &str) -> Result<MemberId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(DomainError::validation("member_id", "Malformed member id")))
}

/// GET /api/events/{event_id} - event with status reconciled at read time.
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&event_id)?;
    let event = state.reconcile_handler().handle(&event_id, Utc::now()).await?;
    Ok(Json(EventResponse::from(event)))
}

/// POST /api/events/{event_id}/registrations - register a member.
pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&event_id)?;
    let member_id = parse_member_id(&request.member_id)?;

    // Reconcile first so a stale stored status (e.g. an event that just
    // ended) cannot accept a registration.
    state.reconcile_handler().handle(&event_id, Utc::now()).await?;

    let result = state
        .register_handler()
        .handle(RegisterForEventCommand { event_id, member_id })
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(result))))
}

/// DELETE /api/events/{event_id}/registrations/{member_id} - unregister.
pub async fn unregister(
    State(state): State<AppState>,
    Path((event_id, member_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&event_id)?;
    let member_id = parse_member_id(&member_id)?;

    state
        .unregister_handler()
        .handle(UnregisterFromEventCommand { event_id, member_id })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
