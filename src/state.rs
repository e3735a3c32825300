//! Shared application state handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{
    AnalyticsService, AuthService, LifecycleService, LinkService, RedirectService,
    ReferralService,
};
use crate::domain::visit_event::VisitEvent;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{
    PgAccountRepository, PgArchiveRepository, PgLinkRepository, PgReferralRequestRepository,
    PgTokenRepository, PgVisitRepository,
};

pub type Links = LinkService<PgLinkRepository>;
pub type Lifecycle = LifecycleService<PgLinkRepository, PgAccountRepository, PgArchiveRepository>;
pub type Referrals = ReferralService<PgLinkRepository, PgReferralRequestRepository>;
pub type Redirects = RedirectService<PgLinkRepository>;
pub type Analytics = AnalyticsService<PgLinkRepository, PgVisitRepository, PgAccountRepository>;
pub type Auth = AuthService<PgTokenRepository>;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub base_url: String,
    pub visit_tx: mpsc::Sender<VisitEvent>,
    pub cache: Arc<dyn CacheService>,
    /// Upper bound for redirect cache entries, in seconds. Entries for
    /// expiring links are clamped to their remaining lifetime.
    pub cache_default_ttl: u64,
    pub link_service: Arc<Links>,
    pub lifecycle_service: Arc<Lifecycle>,
    pub referral_service: Arc<Referrals>,
    pub redirect_service: Arc<Redirects>,
    pub analytics_service: Arc<Analytics>,
    pub auth_service: Arc<Auth>,
    pub archive: Arc<PgArchiveRepository>,
}
