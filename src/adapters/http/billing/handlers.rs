//! HTTP handlers for the subscription and treasury APIs.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::reporting::TreasuryReportQuery;
use crate::application::handlers::subscription::{
    ActivateDuesSubscriptionCommand, CancelDuesSubscriptionCommand,
};
use crate::domain::foundation::{DomainError, MemberId};
use crate::domain::payment::BillingType;

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{ActivateSubscriptionRequest, SubscriptionResponse, TreasuryReportParams,
    TreasuryReportResponse};

fn parse_member_id(raw: &str) -> Result<MemberId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(DomainError::validation("member_id", "Malformed member id")))
}

/// POST /api/members/{member_id}/subscription - activate dues.
pub async fn activate_subscription(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(request): Json<ActivateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member_id = parse_member_id(&member_id)?;
    let billing_type: BillingType = request.billing_type.parse().map_err(ApiError)?;

    let subscription = state
        .activate_subscription_handler()
        .handle(ActivateDuesSubscriptionCommand {
            member_id,
            billing_type,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(subscription)),
    ))
}

/// DELETE /api/members/{member_id}/subscription - cancel dues.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let member_id = parse_member_id(&member_id)?;

    state
        .cancel_subscription_handler()
        .handle(CancelDuesSubscriptionCommand { member_id })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/treasury/report?from=...&to=... - admin read model.
pub async fn treasury_report(
    State(state): State<AppState>,
    Query(params): Query<TreasuryReportParams>,
) -> Result<impl IntoResponse, ApiError> {
    if params.from > params.to {
        return Err(ApiError(DomainError::validation(
            "from",
            "Range start is after range end",
        )));
    }

    let report = state
        .treasury_handler()
        .handle(TreasuryReportQuery {
            from: params.from,
            to: params.to,
        })
        .await?;

    Ok(Json(TreasuryReportResponse::from(report)))
}
