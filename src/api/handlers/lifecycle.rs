//! Handlers for the lifecycle cascades: suspend, expiry shift, delete.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::links::{
    DeleteLinkRequest, DeleteLinkResponse, ShiftExpiryRequest, ShiftExpiryResponse,
    SuspendRequest, SuspendResponse,
};
use crate::api::middleware::auth::AccountId;
use crate::error::AppError;
use crate::state::AppState;

/// Suspends or unsuspends a link family.
///
/// # Endpoint
///
/// `POST /api/links/{short_id}/suspend`
///
/// May be addressed at a referral child; authorization re-routes to the root
/// owner and the change cascades over the whole family. Requires the owner's
/// password.
pub async fn suspend_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<SuspendRequest>,
) -> Result<Json<SuspendResponse>, AppError> {
    let (root, links_updated) = state
        .lifecycle_service
        .set_suspended(&short_id, payload.suspended, account_id, &payload.password)
        .await?;

    invalidate_family(&state, root.id).await;

    Ok(Json(SuspendResponse {
        short_id: root.short_id,
        suspended: payload.suspended,
        links_updated,
    }))
}

/// Applies a signed day-delta to a root link's expiry.
///
/// # Endpoint
///
/// `POST /api/links/{short_id}/expiry`
///
/// The new expiry propagates to all referral children, and every affected
/// link is reactivated.
pub async fn shift_expiry_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<ShiftExpiryRequest>,
) -> Result<Json<ShiftExpiryResponse>, AppError> {
    let (root, expires_at, links_updated) = state
        .lifecycle_service
        .shift_expiry(&short_id, payload.delta_days, account_id)
        .await?;

    invalidate_family(&state, root.id).await;

    Ok(Json(ShiftExpiryResponse {
        short_id: root.short_id,
        expires_at,
        links_updated,
    }))
}

/// Deletes a link family: archive, visit purge and link removal in one
/// transaction.
///
/// # Endpoint
///
/// `DELETE /api/links/{short_id}`
///
/// Requires the owner's password. The family is enumerated before deletion
/// so its cache entries can be dropped afterwards.
pub async fn delete_link_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
    Json(payload): Json<DeleteLinkRequest>,
) -> Result<Json<DeleteLinkResponse>, AppError> {
    // Snapshot the family's short ids while the rows still exist.
    let link = state.link_service.get(&short_id).await?;
    let root_id = link.family_root_id();
    let family_ids = family_short_ids(&state, root_id).await;

    let outcome = state
        .lifecycle_service
        .delete(&short_id, account_id, &payload.password)
        .await?;

    let _ = state.cache.invalidate_many(&family_ids).await;

    Ok(Json(DeleteLinkResponse {
        links_archived: outcome.links_archived,
        visits_deleted: outcome.visits_deleted,
    }))
}

/// Drops the cached targets of a whole family after a cascade.
async fn invalidate_family(state: &AppState, root_id: i64) {
    let ids = family_short_ids(state, root_id).await;
    let _ = state.cache.invalidate_many(&ids).await;
}

async fn family_short_ids(state: &AppState, root_id: i64) -> Vec<String> {
    match state.link_service.family_short_ids(root_id).await {
        Ok(ids) => ids,
        Err(_) => Vec::new(),
    }
}
