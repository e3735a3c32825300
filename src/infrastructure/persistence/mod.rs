//! PostgreSQL repository implementations.

pub mod pg_account_repository;
pub mod pg_archive_repository;
pub mod pg_link_repository;
pub mod pg_referral_request_repository;
pub mod pg_token_repository;
pub mod pg_visit_repository;

pub use pg_account_repository::PgAccountRepository;
pub use pg_archive_repository::PgArchiveRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_referral_request_repository::PgReferralRequestRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_visit_repository::PgVisitRepository;
