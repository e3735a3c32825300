//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{short_id}`        - Short link redirect (public)
//! - `GET  /notice/suspended`  - Landing page for suspended links (public)
//! - `GET  /notice/expired`    - Landing page for expired links (public)
//! - `GET  /health`            - Health check: DB, cache, visit queue (public)
//! - `/api/*`                  - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - Bearer token on the API subtree
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{
    expired_notice_handler, health_handler, redirect_handler, suspended_notice_handler,
};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let router = Router::new()
        .route("/{short_id}", get(redirect_handler))
        .route("/notice/suspended", get(suspended_notice_handler))
        .route("/notice/expired", get(expired_notice_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
