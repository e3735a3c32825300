//! Repository trait for the referral request workflow.

use crate::domain::entities::{Link, NewLink, NewReferralRequest, ReferralRequest, RequestStatus};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for referral requests.
///
/// The approval operation is transactional: the status flip and the referral
/// link insert commit together or not at all, and a `status = 'pending'`
/// guard inside the transaction makes re-approval impossible even under
/// concurrent calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralRequestRepository: Send + Sync {
    /// Opens a new pending request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicatePending`] when the requester already has
    /// a pending request for the link (partial unique index).
    async fn create(&self, request: NewReferralRequest) -> Result<ReferralRequest, AppError>;

    /// Finds a request by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<ReferralRequest>, AppError>;

    /// Lists requests addressed to an owner, optionally filtered by status,
    /// newest first.
    async fn list_for_owner(
        &self,
        owner_id: i64,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ReferralRequest>, AppError>;

    /// Approves a pending request and materializes its referral link in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the request is no longer
    /// pending, [`AppError::AliasConflict`] when the referral short id is
    /// taken; either way nothing is committed.
    async fn approve(&self, request_id: i64, new_link: NewLink) -> Result<Link, AppError>;

    /// Declines a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the request is no longer
    /// pending.
    async fn decline(&self, request_id: i64) -> Result<ReferralRequest, AppError>;
}
