//! Referral request workflow: open, list, approve and decline requests for
//! referral copies of a root link.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::entities::{
    Link, NewLink, NewReferralRequest, ReferralRequest, RequestStatus,
};
use crate::domain::repositories::{LinkRepository, ReferralRequestRepository};
use crate::error::AppError;
use crate::utils::short_token::{generate_short_id, validate_custom_id};

/// Service driving the `pending -> approved | declined` request lifecycle.
pub struct ReferralService<L, R>
where
    L: LinkRepository,
    R: ReferralRequestRepository,
{
    links: Arc<L>,
    requests: Arc<R>,
}

impl<L, R> ReferralService<L, R>
where
    L: LinkRepository,
    R: ReferralRequestRepository,
{
    pub fn new(links: Arc<L>, requests: Arc<R>) -> Self {
        Self { links, requests }
    }

    /// Opens a referral request against a root link.
    ///
    /// The link owner is captured on the request at this point; a later
    /// ownership change does not move decision rights for requests already
    /// opened.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the link is a referral itself,
    /// has referrals disabled, or the requester owns it, and
    /// [`AppError::DuplicatePending`] when the requester already has a
    /// pending request for the link.
    pub async fn create(
        &self,
        short_id: &str,
        requester_id: i64,
        custom_alias: Option<String>,
    ) -> Result<ReferralRequest, AppError> {
        let link = self.find_link(short_id).await?;

        if link.is_referral {
            return Err(AppError::bad_request(
                "Referral requests may only target root links",
                json!({ "short_id": short_id }),
            ));
        }

        if !link.allow_referrals {
            return Err(AppError::bad_request(
                "This link does not accept referral requests",
                json!({ "short_id": short_id }),
            ));
        }

        let owner_id = link.owner_id.ok_or_else(|| {
            AppError::bad_request(
                "Anonymous links cannot accept referral requests",
                json!({ "short_id": short_id }),
            )
        })?;

        if owner_id == requester_id {
            return Err(AppError::bad_request(
                "Link owners cannot request referrals of their own link",
                json!({ "short_id": short_id }),
            ));
        }

        if let Some(alias) = &custom_alias {
            validate_custom_id(alias)?;
        }

        let request = self
            .requests
            .create(NewReferralRequest {
                link_id: link.id,
                requester_id,
                owner_id,
                custom_alias,
            })
            .await?;

        info!(
            request_id = request.id,
            short_id = %link.short_id,
            requester_id,
            "referral request opened"
        );

        Ok(request)
    }

    /// Lists requests addressed to an owner, optionally by status.
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ReferralRequest>, AppError> {
        self.requests.list_for_owner(owner_id, status).await
    }

    /// Approves a pending request, creating its referral link.
    ///
    /// The referral's short id is the request's custom alias when present,
    /// otherwise a freshly generated token. The new link copies the parent's
    /// current target and inherits its suspension flag and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor_id` is the owner
    /// captured on the request and [`AppError::Validation`] when the request
    /// was already decided.
    pub async fn approve(&self, request_id: i64, actor_id: i64) -> Result<Link, AppError> {
        let request = self.find_request(request_id).await?;
        self.require_decider(&request, actor_id)?;

        let parent = self
            .links
            .find_by_id(request.link_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Parent link no longer exists",
                    json!({ "request_id": request_id }),
                )
            })?;

        let short_id = match &request.custom_alias {
            Some(alias) => {
                if self.links.find_by_short_id(alias).await?.is_some() {
                    return Err(AppError::alias_conflict(
                        "Requested alias is no longer available",
                        json!({ "short_id": alias }),
                    ));
                }
                alias.clone()
            }
            None => generate_short_id(),
        };

        let link = self
            .requests
            .approve(
                request_id,
                NewLink::referral(short_id, &parent, request.requester_id),
            )
            .await?;

        info!(
            request_id,
            short_id = %link.short_id,
            parent = %parent.short_id,
            "referral request approved"
        );

        Ok(link)
    }

    /// Declines a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor_id` is the owner
    /// captured on the request and [`AppError::Validation`] when the request
    /// was already decided.
    pub async fn decline(
        &self,
        request_id: i64,
        actor_id: i64,
    ) -> Result<ReferralRequest, AppError> {
        let request = self.find_request(request_id).await?;
        self.require_decider(&request, actor_id)?;

        let declined = self.requests.decline(request_id).await?;

        info!(request_id, "referral request declined");

        Ok(declined)
    }

    fn require_decider(&self, request: &ReferralRequest, actor_id: i64) -> Result<(), AppError> {
        if request.owner_id != actor_id {
            return Err(AppError::forbidden(
                "Only the owner captured on the request may decide it",
                json!({ "request_id": request.id }),
            ));
        }
        Ok(())
    }

    async fn find_link(&self, short_id: &str) -> Result<Link, AppError> {
        self.links
            .find_by_short_id(short_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_id": short_id }))
            })
    }

    async fn find_request(&self, request_id: i64) -> Result<ReferralRequest, AppError> {
        self.requests.find_by_id(request_id).await?.ok_or_else(|| {
            AppError::not_found(
                "Referral request not found",
                json!({ "request_id": request_id }),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, MockReferralRequestRepository};
    use chrono::{Duration, Utc};

    fn root_link(id: i64, owner: Option<i64>, allow_referrals: bool) -> Link {
        let now = Utc::now();
        Link {
            id,
            short_id: format!("root{id}"),
            target_url: "https://example.com/".to_string(),
            owner_id: owner,
            is_referral: false,
            root_link_id: None,
            referrer_id: None,
            allow_referrals,
            is_suspended: false,
            expires_at: Some(now + Duration::days(30)),
            total_clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn pending_request(id: i64, link_id: i64, requester: i64, owner: i64) -> ReferralRequest {
        ReferralRequest {
            id,
            link_id,
            requester_id: requester,
            owner_id: owner,
            status: RequestStatus::Pending,
            custom_alias: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_captures_owner_from_link() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_short_id()
            .returning(|_| Ok(Some(root_link(1, Some(10), true))));

        let mut requests = MockReferralRequestRepository::new();
        requests
            .expect_create()
            .withf(|nr| nr.link_id == 1 && nr.requester_id == 20 && nr.owner_id == 10)
            .times(1)
            .returning(|nr| {
                Ok(ReferralRequest {
                    id: 7,
                    link_id: nr.link_id,
                    requester_id: nr.requester_id,
                    owner_id: nr.owner_id,
                    status: RequestStatus::Pending,
                    custom_alias: nr.custom_alias,
                    created_at: Utc::now(),
                    decided_at: None,
                })
            });

        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let request = service.create("root1", 20, None).await.unwrap();
        assert_eq!(request.owner_id, 10);
    }

    #[tokio::test]
    async fn test_create_rejects_when_referrals_disabled() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_short_id()
            .returning(|_| Ok(Some(root_link(1, Some(10), false))));

        let requests = MockReferralRequestRepository::new();
        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let result = service.create("root1", 20, None).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_referral_target() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_short_id().returning(|_| {
            let mut link = root_link(2, Some(20), false);
            link.is_referral = true;
            link.root_link_id = Some(1);
            link.referrer_id = Some(20);
            Ok(Some(link))
        });

        let requests = MockReferralRequestRepository::new();
        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let result = service.create("ref2", 30, None).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_owner_as_requester() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_short_id()
            .returning(|_| Ok(Some(root_link(1, Some(10), true))));

        let requests = MockReferralRequestRepository::new();
        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let result = service.create("root1", 10, None).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_approve_requires_captured_owner() {
        let links = MockLinkRepository::new();

        let mut requests = MockReferralRequestRepository::new();
        requests
            .expect_find_by_id()
            .returning(|id| Ok(Some(pending_request(id, 1, 20, 10))));
        requests.expect_approve().times(0);

        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let result = service.approve(7, 99).await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_approve_uses_custom_alias_when_present() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(root_link(id, Some(10), true))));
        links
            .expect_find_by_short_id()
            .withf(|s| s == "my-alias")
            .returning(|_| Ok(None));

        let mut requests = MockReferralRequestRepository::new();
        requests.expect_find_by_id().returning(|id| {
            let mut request = pending_request(id, 1, 20, 10);
            request.custom_alias = Some("my-alias".to_string());
            Ok(Some(request))
        });
        requests
            .expect_approve()
            .withf(|request_id, nl| {
                *request_id == 7
                    && nl.short_id == "my-alias"
                    && nl.is_referral
                    && nl.root_link_id == Some(1)
                    && nl.referrer_id == Some(20)
                    && nl.owner_id == Some(20)
            })
            .times(1)
            .returning(|_, nl| {
                let now = Utc::now();
                Ok(Link {
                    id: 99,
                    short_id: nl.short_id,
                    target_url: nl.target_url,
                    owner_id: nl.owner_id,
                    is_referral: true,
                    root_link_id: nl.root_link_id,
                    referrer_id: nl.referrer_id,
                    allow_referrals: false,
                    is_suspended: nl.is_suspended,
                    expires_at: nl.expires_at,
                    total_clicks: 0,
                    created_at: now,
                    updated_at: now,
                })
            });

        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let link = service.approve(7, 10).await.unwrap();
        assert_eq!(link.short_id, "my-alias");
        assert_eq!(link.referrer_id, Some(20));
    }

    #[tokio::test]
    async fn test_approve_generates_token_without_alias() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(root_link(id, Some(10), true))));

        let mut requests = MockReferralRequestRepository::new();
        requests
            .expect_find_by_id()
            .returning(|id| Ok(Some(pending_request(id, 1, 20, 10))));
        requests
            .expect_approve()
            .withf(|_, nl| nl.short_id.len() == 12)
            .times(1)
            .returning(|_, nl| {
                let now = Utc::now();
                Ok(Link {
                    id: 99,
                    short_id: nl.short_id,
                    target_url: nl.target_url,
                    owner_id: nl.owner_id,
                    is_referral: true,
                    root_link_id: nl.root_link_id,
                    referrer_id: nl.referrer_id,
                    allow_referrals: false,
                    is_suspended: nl.is_suspended,
                    expires_at: nl.expires_at,
                    total_clicks: 0,
                    created_at: now,
                    updated_at: now,
                })
            });

        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        service.approve(7, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_decline_requires_captured_owner() {
        let links = MockLinkRepository::new();

        let mut requests = MockReferralRequestRepository::new();
        requests
            .expect_find_by_id()
            .returning(|id| Ok(Some(pending_request(id, 1, 20, 10))));
        requests.expect_decline().times(0);

        let service = ReferralService::new(Arc::new(links), Arc::new(requests));

        let result = service.decline(7, 20).await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }
}
