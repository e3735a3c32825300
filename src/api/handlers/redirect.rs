//! Handler for short URL redirects, plus the suspension and expiry notice
//! pages.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{debug, error, warn};

use crate::application::services::RedirectOutcome;
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;
use crate::state::AppState;

/// What the redirect cache stores per short id: enough to both redirect and
/// attribute the visit without touching the database.
#[derive(Debug, Serialize, Deserialize)]
struct CachedTarget {
    link_id: i64,
    target_url: String,
}

/// Redirects a short id to its target URL.
///
/// # Endpoint
///
/// `GET /{short_id}`
///
/// # Request Flow
///
/// 1. Check cache; a hit redirects immediately
/// 2. On miss, resolve against the database
/// 3. Live targets are written back to cache with a TTL clamped to the
///    link's remaining lifetime (fire-and-forget)
/// 4. A visit event goes to the background worker over a bounded channel;
///    a full queue drops it without failing the redirect
///
/// Suspended and expired links redirect to their notice pages; they are
/// terminal states, not errors.
///
/// # Errors
///
/// Returns 404 Not Found when the short id doesn't exist.
pub async fn redirect_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let ip = addr.ip().to_string();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    if let Ok(Some(raw)) = state.cache.get_target(&short_id).await {
        match serde_json::from_str::<CachedTarget>(&raw) {
            Ok(cached) => {
                debug!("Cache HIT for {}", short_id);
                emit_visit(&state, cached.link_id, &short_id, ip, user_agent, referer);
                return Ok(Redirect::temporary(&cached.target_url));
            }
            Err(e) => {
                warn!("Discarding malformed cache entry for {}: {}", short_id, e);
                let _ = state.cache.invalidate(&short_id).await;
            }
        }
    }

    debug!("Cache MISS for {}", short_id);

    match state.redirect_service.resolve(&short_id).await? {
        RedirectOutcome::NotFound => Err(AppError::not_found(
            "Short link not found",
            json!({ "short_id": short_id }),
        )),
        RedirectOutcome::Suspended => Ok(Redirect::temporary("/notice/suspended")),
        RedirectOutcome::Expired => Ok(Redirect::temporary("/notice/expired")),
        RedirectOutcome::Target(resolved) => {
            let ttl = resolved
                .remaining_seconds
                .map(|r| r.min(state.cache_default_ttl))
                .unwrap_or(state.cache_default_ttl);

            let entry = CachedTarget {
                link_id: resolved.link_id,
                target_url: resolved.target_url.clone(),
            };

            // Fire-and-forget cache write.
            if let Ok(serialized) = serde_json::to_string(&entry) {
                let cache = state.cache.clone();
                let key = short_id.clone();
                tokio::spawn(async move {
                    if let Err(e) = cache.set_target(&key, &serialized, Some(ttl)).await {
                        error!("Failed to cache target: {}", e);
                    }
                });
            }

            emit_visit(&state, resolved.link_id, &short_id, ip, user_agent, referer);

            Ok(Redirect::temporary(&resolved.target_url))
        }
    }
}

fn emit_visit(
    state: &AppState,
    link_id: i64,
    short_id: &str,
    ip: String,
    user_agent: Option<&str>,
    referer: Option<&str>,
) {
    let event = VisitEvent::new(link_id, short_id.to_string(), ip, user_agent, referer);

    if let Err(e) = state.visit_tx.try_send(event) {
        metrics::counter!("relink_visits_dropped_total").increment(1);
        warn!(short_id, error = %e, "visit queue full, event dropped");
    }
}

/// Notice page for suspended links.
///
/// # Endpoint
///
/// `GET /notice/suspended`
pub async fn suspended_notice_handler() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html><html><head><title>Link suspended</title></head>\
         <body><h1>This link is suspended</h1>\
         <p>The owner has temporarily disabled this short link.</p></body></html>",
    )
}

/// Notice page for expired links.
///
/// # Endpoint
///
/// `GET /notice/expired`
pub async fn expired_notice_handler() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html><html><head><title>Link expired</title></head>\
         <body><h1>This link has expired</h1>\
         <p>The short link's lifetime has run out. The owner can extend it \
         to bring it back.</p></body></html>",
    )
}
