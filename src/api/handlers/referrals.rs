//! Handlers for the referral request workflow.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::LinkResponse;
use crate::api::dto::referrals::{
    CreateReferralRequest, ListReferralQuery, ReferralRequestResponse,
};
use crate::api::middleware::auth::AccountId;
use crate::domain::entities::RequestStatus;
use crate::error::AppError;
use crate::state::AppState;

/// Opens a referral request against a root link.
///
/// # Endpoint
///
/// `POST /api/links/{short_id}/referral-requests`
///
/// # Errors
///
/// Returns 400 when the link rejects referrals and 409 when the requester
/// already has a pending request for it.
pub async fn create_referral_request_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<CreateReferralRequest>,
) -> Result<(StatusCode, Json<ReferralRequestResponse>), AppError> {
    payload.validate()?;

    let request = state
        .referral_service
        .create(&short_id, account_id, payload.custom_alias)
        .await?;

    Ok((StatusCode::CREATED, Json(request.into())))
}

/// Lists referral requests addressed to the authenticated owner.
///
/// # Endpoint
///
/// `GET /api/referral-requests?status=pending`
pub async fn list_referral_requests_handler(
    Query(query): Query<ListReferralQuery>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<Vec<ReferralRequestResponse>>, AppError> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(RequestStatus::parse(raw).ok_or_else(|| {
            AppError::bad_request(
                "Unknown status filter",
                json!({ "status": raw, "expected": ["pending", "approved", "declined"] }),
            )
        })?),
    };

    let requests = state
        .referral_service
        .list_for_owner(account_id, status)
        .await?;

    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Approves a pending referral request, creating the referral link.
///
/// # Endpoint
///
/// `POST /api/referral-requests/{id}/approve`
pub async fn approve_referral_request_handler(
    Path(request_id): Path<i64>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let link = state
        .referral_service
        .approve(request_id, account_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.base_url)),
    ))
}

/// Declines a pending referral request.
///
/// # Endpoint
///
/// `POST /api/referral-requests/{id}/decline`
pub async fn decline_referral_request_handler(
    Path(request_id): Path<i64>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<ReferralRequestResponse>, AppError> {
    let request = state
        .referral_service
        .decline(request_id, account_id)
        .await?;

    Ok(Json(request.into()))
}
