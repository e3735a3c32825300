//! Handlers for link creation and maintenance.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::api::middleware::auth::AccountId;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "target_url": "https://example.com/some/long/path",
///   "custom_id": "my-link",       // optional
///   "expires_in_days": 30          // optional, defaults to 90
/// }
/// ```
///
/// # Errors
///
/// Returns 400 on a malformed URL or custom id, 409 when the custom id is
/// taken or the owner already shortened this target.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create(
            payload.target_url,
            Some(account_id),
            payload.custom_id,
            payload.expires_in_days,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.base_url)),
    ))
}

/// Lists the authenticated account's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_owned(account_id).await?;

    Ok(Json(
        links
            .into_iter()
            .map(|l| LinkResponse::from_link(l, &state.base_url))
            .collect(),
    ))
}

/// Fetches one link owned by the authenticated account.
///
/// # Endpoint
///
/// `GET /api/links/{short_id}`
pub async fn get_link_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get(&short_id).await?;

    if link.owner_id != Some(account_id) {
        return Err(AppError::forbidden(
            "Only the link owner may view it",
            json!({ "short_id": short_id }),
        ));
    }

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Partially updates a link: rename, retarget, or toggle referrals.
///
/// # Endpoint
///
/// `PATCH /api/links/{short_id}`
///
/// Fields are applied in order (rename, then target, then the referral
/// toggle); the first failure aborts the rest. Rename and retarget
/// invalidate the redirect cache for the old short id.
pub async fn update_link_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let mut current_id = short_id.clone();
    let mut changed = false;

    if let Some(new_short_id) = payload.new_short_id {
        let link = state
            .link_service
            .rename(&current_id, new_short_id, account_id)
            .await?;
        current_id = link.short_id;
        changed = true;
    }

    if let Some(target_url) = payload.target_url {
        state
            .link_service
            .edit_target(&current_id, target_url, account_id)
            .await?;
        changed = true;
    }

    if let Some(allow) = payload.allow_referrals {
        state
            .link_service
            .set_allow_referrals(&current_id, allow, account_id)
            .await?;
    }

    if changed {
        // Stale target or renamed id; drop both keys.
        let _ = state.cache.invalidate(&short_id).await;
        let _ = state.cache.invalidate(&current_id).await;
    }

    let link = state.link_service.get(&current_id).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}
