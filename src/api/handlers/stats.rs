//! Handlers for link statistics and raw visit listing.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::stats::VisitResponse;
use crate::api::middleware::auth::AccountId;
use crate::application::aggregation::LinkStatistics;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the full statistics bundle for a root link.
///
/// # Endpoint
///
/// `GET /api/links/{short_id}/stats`
///
/// Figures are recomputed from stored visit rows at request time; the
/// referral breakdown rolls up every child's own visits.
pub async fn link_stats_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<LinkStatistics>, AppError> {
    let stats = state
        .analytics_service
        .link_statistics(&short_id, account_id)
        .await?;

    Ok(Json(stats))
}

/// Lists a link's raw visit rows, oldest first.
///
/// # Endpoint
///
/// `GET /api/links/{short_id}/visits`
pub async fn link_visits_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<Vec<VisitResponse>>, AppError> {
    let visits = state
        .analytics_service
        .visits(&short_id, account_id)
        .await?;

    Ok(Json(visits.into_iter().map(Into::into).collect()))
}
