//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, background workers, and the
//! Axum server lifecycle.

use crate::config::Config;
use crate::domain::geo::GeoProvider;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geo::{MaxMindProvider, NullGeoProvider};
use crate::infrastructure::persistence::{
    PgAccountRepository, PgArchiveRepository, PgLinkRepository, PgReferralRequestRepository,
    PgTokenRepository, PgVisitRepository,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::password::Argon2Verifier;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::services::{
    AnalyticsService, AuthService, LifecycleService, LinkService, RedirectService,
    ReferralService,
};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (or NullCache fallback)
/// - GeoIP provider (or NullGeoProvider fallback)
/// - Background visit worker
/// - Periodic expiration sweep and archive purge
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let geo: Arc<dyn GeoProvider> = match &config.geoip_db_path {
        Some(path) => match MaxMindProvider::open(path) {
            Ok(provider) => {
                tracing::info!("GeoIP enabled ({})", path);
                Arc::new(provider)
            }
            Err(e) => {
                tracing::warn!("Failed to open GeoIP database: {}. Geolocation disabled.", e);
                Arc::new(NullGeoProvider::new())
            }
        },
        None => Arc::new(NullGeoProvider::new()),
    };

    let pool_arc = Arc::new(pool.clone());
    let link_repository = Arc::new(PgLinkRepository::new(pool_arc.clone()));
    let visit_repository = Arc::new(PgVisitRepository::new(pool_arc.clone()));
    let account_repository = Arc::new(PgAccountRepository::new(pool_arc.clone()));
    let request_repository = Arc::new(PgReferralRequestRepository::new(pool_arc.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool_arc.clone()));
    let archive_repository = Arc::new(PgArchiveRepository::new(pool_arc.clone()));

    let (visit_tx, visit_rx) = mpsc::channel(config.visit_queue_capacity);

    tokio::spawn(run_visit_worker(
        visit_rx,
        visit_repository.clone(),
        link_repository.clone(),
        geo,
        Duration::from_millis(config.geo_lookup_timeout_ms),
    ));
    tracing::info!("Visit worker started");

    let lifecycle_service = Arc::new(LifecycleService::new(
        link_repository.clone(),
        account_repository.clone(),
        archive_repository.clone(),
        Arc::new(Argon2Verifier::new()),
    ));

    tokio::spawn(run_expiration_sweep(
        lifecycle_service.clone(),
        cache.clone(),
        config.sweep_interval_seconds,
        config.archive_retention_days,
    ));
    tracing::info!("Expiration sweep started");

    let state = AppState {
        db: pool,
        base_url: config.base_url.clone(),
        visit_tx,
        cache,
        cache_default_ttl: config.cache_ttl_seconds,
        link_service: Arc::new(LinkService::new(link_repository.clone())),
        lifecycle_service,
        referral_service: Arc::new(ReferralService::new(
            link_repository.clone(),
            request_repository,
        )),
        redirect_service: Arc::new(RedirectService::new(link_repository.clone())),
        analytics_service: Arc::new(AnalyticsService::new(
            link_repository,
            visit_repository,
            account_repository,
        )),
        auth_service: Arc::new(AuthService::new(
            token_repository,
            config.token_signing_secret.clone(),
        )),
        archive: archive_repository,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}

/// Periodically suspends expired link families and purges old archive rows.
///
/// Swept short ids are evicted from the redirect cache so a stale cached
/// target cannot outlive its link.
async fn run_expiration_sweep<L, Acc, Ar>(
    lifecycle: Arc<LifecycleService<L, Acc, Ar>>,
    cache: Arc<dyn CacheService>,
    interval_seconds: u64,
    retention_days: i64,
) where
    L: crate::domain::repositories::LinkRepository,
    Acc: crate::domain::repositories::AccountRepository,
    Ar: crate::domain::repositories::ArchiveRepository,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match lifecycle.sweep_expired(Utc::now()).await {
            Ok(swept) if !swept.is_empty() => {
                if let Err(e) = cache.invalidate_many(&swept).await {
                    tracing::warn!("Failed to evict swept links from cache: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Expiration sweep failed: {}", e);
            }
        }

        if let Err(e) = lifecycle.purge_archives(retention_days).await {
            tracing::warn!("Archive purge failed: {}", e);
        }
    }
}
