//! Handler for the deleted-link archive.

use axum::{Extension, Json, extract::State};

use crate::api::dto::archive::DeletedLinkResponse;
use crate::api::middleware::auth::AccountId;
use crate::domain::repositories::ArchiveRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the authenticated owner's archived (deleted) links, newest first.
///
/// # Endpoint
///
/// `GET /api/archive`
///
/// Rows disappear permanently once the retention window lapses.
pub async fn archive_list_handler(
    State(state): State<AppState>,
    Extension(AccountId(account_id)): Extension<AccountId>,
) -> Result<Json<Vec<DeletedLinkResponse>>, AppError> {
    let archived = state.archive.list_for_owner(account_id).await?;

    Ok(Json(archived.into_iter().map(Into::into).collect()))
}
