//! API route configuration.
//!
//! All `/api` endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    approve_referral_request_handler, archive_list_handler, create_link_handler,
    create_referral_request_handler, decline_referral_request_handler, delete_link_handler,
    get_link_handler, link_stats_handler, link_visits_handler, list_links_handler,
    list_referral_requests_handler, shift_expiry_handler, suspend_handler,
    update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`                          - Create a short link
/// - `GET    /links`                          - List own links
/// - `GET    /links/{short_id}`               - Link detail
/// - `PATCH  /links/{short_id}`               - Rename / retarget / toggle referrals
/// - `DELETE /links/{short_id}`               - Delete a link family (password)
/// - `POST   /links/{short_id}/suspend`       - Suspend/unsuspend a family (password)
/// - `POST   /links/{short_id}/expiry`        - Shift a family's expiry
/// - `GET    /links/{short_id}/stats`         - Statistics bundle
/// - `GET    /links/{short_id}/visits`        - Raw visit rows
/// - `POST   /links/{short_id}/referral-requests` - Open a referral request
/// - `GET    /referral-requests`              - List requests addressed to me
/// - `POST   /referral-requests/{id}/approve` - Approve (creates referral link)
/// - `POST   /referral-requests/{id}/decline` - Decline
/// - `GET    /archive`                        - My deleted-link archive
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler).get(list_links_handler))
        .route(
            "/links/{short_id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{short_id}/suspend", post(suspend_handler))
        .route("/links/{short_id}/expiry", post(shift_expiry_handler))
        .route("/links/{short_id}/stats", get(link_stats_handler))
        .route("/links/{short_id}/visits", get(link_visits_handler))
        .route(
            "/links/{short_id}/referral-requests",
            post(create_referral_request_handler),
        )
        .route(
            "/referral-requests",
            get(list_referral_requests_handler),
        )
        .route(
            "/referral-requests/{id}/approve",
            post(approve_referral_request_handler),
        )
        .route(
            "/referral-requests/{id}/decline",
            post(decline_referral_request_handler),
        )
        .route("/archive", get(archive_list_handler))
}
