//! Repository trait definitions for the domain layer.
//!
//! Traits define the data-access contracts; PostgreSQL implementations live
//! in `crate::infrastructure::persistence`, and mockall generates test mocks
//! under `cfg(test)`.
//!
//! The multi-row atomic units the lifecycle coordinator needs (suspend /
//! extend / delete cascades, referral approval) are modeled as single trait
//! methods so an implementation can wrap each one in one transaction.

pub mod account_repository;
pub mod archive_repository;
pub mod link_repository;
pub mod referral_request_repository;
pub mod token_repository;
pub mod visit_repository;

pub use account_repository::AccountRepository;
pub use archive_repository::ArchiveRepository;
pub use link_repository::{FamilyDeletion, LinkRepository};
pub use referral_request_repository::ReferralRequestRepository;
pub use token_repository::{ApiToken, TokenRepository};
pub use visit_repository::VisitRepository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use archive_repository::MockArchiveRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use referral_request_repository::MockReferralRequestRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
