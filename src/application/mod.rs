//! Application layer: business logic services and the aggregation engine.
//!
//! This layer orchestrates domain operations by coordinating repository
//! calls, validation, and business rules. Services consume repository traits
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and maintenance
//! - [`services::lifecycle_service::LifecycleService`] - Family-wide suspend/extend/delete
//! - [`services::referral_service::ReferralService`] - Referral request workflow
//! - [`services::redirect_service::RedirectService`] - The redirect read path
//! - [`services::analytics_service::AnalyticsService`] - Statistics assembly
//! - [`services::auth_service::AuthService`] - API token authentication
//!
//! [`aggregation`] holds the pure statistics engine the analytics service
//! builds on.

pub mod aggregation;
pub mod services;
