//! Business logic services for the application layer.

pub mod analytics_service;
pub mod auth_service;
pub mod lifecycle_service;
pub mod link_service;
pub mod redirect_service;
pub mod referral_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use lifecycle_service::LifecycleService;
pub use link_service::LinkService;
pub use redirect_service::{RedirectOutcome, RedirectService, ResolvedTarget};
pub use referral_service::ReferralService;
