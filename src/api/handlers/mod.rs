//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod archive;
pub mod health;
pub mod lifecycle;
pub mod links;
pub mod redirect;
pub mod referrals;
pub mod stats;

pub use archive::archive_list_handler;
pub use health::health_handler;
pub use lifecycle::{delete_link_handler, shift_expiry_handler, suspend_handler};
pub use links::{
    create_link_handler, get_link_handler, list_links_handler, update_link_handler,
};
pub use redirect::{expired_notice_handler, redirect_handler, suspended_notice_handler};
pub use referrals::{
    approve_referral_request_handler, create_referral_request_handler,
    decline_referral_request_handler, list_referral_requests_handler,
};
pub use stats::{link_stats_handler, link_visits_handler};
