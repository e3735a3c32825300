//! Link registry service: create, find, rename, edit target.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::short_token::{generate_short_id, validate_custom_id};
use crate::utils::url_normalizer::normalize_target_url;

/// Default lifetime of a new link when no expiry is requested.
pub const DEFAULT_EXPIRY_DAYS: i64 = 90;

/// Attempts at generating a collision-free short id.
const MAX_GENERATE_ATTEMPTS: usize = 10;

/// Service for creating and maintaining short links.
pub struct LinkService<L: LinkRepository> {
    links: Arc<L>,
}

impl<L: LinkRepository> LinkService<L> {
    pub fn new(links: Arc<L>) -> Self {
        Self { links }
    }

    /// Creates a new root link.
    ///
    /// The target URL is normalized and validated; a missing
    /// `expires_in_days` defaults to 90 days from now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed target or custom id,
    /// [`AppError::AliasConflict`] when the custom id is taken, and
    /// [`AppError::TargetConflict`] when the owner already shortened the
    /// same target.
    pub async fn create(
        &self,
        target_url: String,
        owner_id: Option<i64>,
        custom_id: Option<String>,
        expires_in_days: Option<i64>,
    ) -> Result<Link, AppError> {
        let normalized = normalize_target_url(&target_url).map_err(|e| {
            AppError::bad_request("Invalid target URL", json!({ "reason": e.to_string() }))
        })?;

        if let Some(days) = expires_in_days {
            if days <= 0 {
                return Err(AppError::bad_request(
                    "expires_in_days must be positive",
                    json!({ "expires_in_days": days }),
                ));
            }
        }

        let expires_at = Utc::now() + Duration::days(expires_in_days.unwrap_or(DEFAULT_EXPIRY_DAYS));

        let short_id = match custom_id {
            Some(custom) => {
                validate_custom_id(&custom)?;

                if self.links.find_by_short_id(&custom).await?.is_some() {
                    return Err(AppError::alias_conflict(
                        "Custom id already in use",
                        json!({ "short_id": custom }),
                    ));
                }

                custom
            }
            None => self.generate_unique_short_id().await?,
        };

        self.links
            .create(NewLink::root(short_id, normalized, owner_id, Some(expires_at)))
            .await
    }

    /// Retrieves a link by short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no link matches.
    pub async fn get(&self, short_id: &str) -> Result<Link, AppError> {
        self.links
            .find_by_short_id(short_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_id": short_id }))
            })
    }

    /// Lists an owner's links, newest first.
    pub async fn list_owned(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        self.links.list_by_owner(owner_id).await
    }

    /// Changes a link's short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor_id` owns the link and
    /// [`AppError::AliasConflict`] when the new id is taken.
    pub async fn rename(
        &self,
        short_id: &str,
        new_short_id: String,
        actor_id: i64,
    ) -> Result<Link, AppError> {
        let link = self.get(short_id).await?;
        self.require_owner(&link, actor_id)?;

        validate_custom_id(&new_short_id)?;

        if self.links.find_by_short_id(&new_short_id).await?.is_some() {
            return Err(AppError::alias_conflict(
                "Short id already in use",
                json!({ "short_id": new_short_id }),
            ));
        }

        self.links.rename(link.id, &new_short_id).await
    }

    /// Changes a link's target URL.
    ///
    /// Uniqueness of targets is scoped per owner: the edit fails only when
    /// the same owner already points another link at the normalized URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor_id` owns the link and
    /// [`AppError::TargetConflict`] on a per-owner duplicate.
    pub async fn edit_target(
        &self,
        short_id: &str,
        new_target: String,
        actor_id: i64,
    ) -> Result<Link, AppError> {
        let link = self.get(short_id).await?;
        self.require_owner(&link, actor_id)?;

        let normalized = normalize_target_url(&new_target).map_err(|e| {
            AppError::bad_request("Invalid target URL", json!({ "reason": e.to_string() }))
        })?;

        if let Some(existing) = self
            .links
            .find_by_owner_and_target(actor_id, &normalized)
            .await?
        {
            if existing.id != link.id {
                return Err(AppError::target_conflict(
                    "Owner already has a link for this target URL",
                    json!({ "target_url": normalized, "short_id": existing.short_id }),
                ));
            }
        }

        self.links.update_target(link.id, &normalized).await
    }

    /// Toggles whether referral requests may be opened against a root link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for referral links (the gate lives
    /// on the root) and [`AppError::Forbidden`] for non-owners.
    pub async fn set_allow_referrals(
        &self,
        short_id: &str,
        allow: bool,
        actor_id: i64,
    ) -> Result<Link, AppError> {
        let link = self.get(short_id).await?;
        self.require_owner(&link, actor_id)?;

        if link.is_referral {
            return Err(AppError::bad_request(
                "Referral links cannot accept referral requests",
                json!({ "short_id": short_id }),
            ));
        }

        self.links.set_allow_referrals(link.id, allow).await
    }

    /// Short ids of a whole family (root first, then children). Used for
    /// cache invalidation after a cascade.
    pub async fn family_short_ids(&self, root_id: i64) -> Result<Vec<String>, AppError> {
        let mut ids = Vec::new();

        if let Some(root) = self.links.find_by_id(root_id).await? {
            ids.push(root.short_id);
        }

        for child in self.links.find_children(root_id).await? {
            ids.push(child.short_id);
        }

        Ok(ids)
    }

    /// Full short URL for a link.
    pub fn short_url(&self, base_url: &str, short_id: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), short_id)
    }

    fn require_owner(&self, link: &Link, actor_id: i64) -> Result<(), AppError> {
        if link.owner_id != Some(actor_id) {
            return Err(AppError::forbidden(
                "Only the link owner may modify it",
                json!({ "short_id": link.short_id }),
            ));
        }
        Ok(())
    }

    /// Generates a short id that is free at the time of the check, retrying
    /// a bounded number of times on collision.
    async fn generate_unique_short_id(&self) -> Result<String, AppError> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let candidate = generate_short_id();

            if self.links.find_by_short_id(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }

        Err(AppError::internal(
            "Failed to generate a unique short id",
            json!({ "attempts": MAX_GENERATE_ATTEMPTS }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    fn stored_link(id: i64, new_link: &NewLink) -> Link {
        let now = Utc::now();
        Link {
            id,
            short_id: new_link.short_id.clone(),
            target_url: new_link.target_url.clone(),
            owner_id: new_link.owner_id,
            is_referral: new_link.is_referral,
            root_link_id: new_link.root_link_id,
            referrer_id: new_link.referrer_id,
            allow_referrals: new_link.allow_referrals,
            is_suspended: new_link.is_suspended,
            expires_at: new_link.expires_at,
            total_clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn owned_link(id: i64, short_id: &str, owner: i64) -> Link {
        stored_link(
            id,
            &NewLink::root(
                short_id.to_string(),
                "https://example.com/".to_string(),
                Some(owner),
                None,
            ),
        )
    }

    #[tokio::test]
    async fn test_create_defaults_to_ninety_day_expiry() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_short_id().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|nl| {
                let expires = nl.expires_at.expect("default expiry must be set");
                let days = (expires - Utc::now()).num_days();
                (89..=90).contains(&days) && !nl.is_referral
            })
            .times(1)
            .returning(|nl| Ok(stored_link(1, &nl)));

        let service = LinkService::new(Arc::new(repo));

        let link = service
            .create("https://example.com".to_string(), Some(1), None, None)
            .await
            .unwrap();

        assert_eq!(link.target_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url() {
        let repo = MockLinkRepository::new();
        let service = LinkService::new(Arc::new(repo));

        let result = service
            .create("not-a-url".to_string(), None, None, None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_nonpositive_expiry() {
        let repo = MockLinkRepository::new();
        let service = LinkService::new(Arc::new(repo));

        let result = service
            .create("https://example.com".to_string(), None, None, Some(0))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_id_conflict() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_short_id()
            .withf(|s| s == "taken-alias")
            .times(1)
            .returning(|s| Ok(Some(owned_link(5, s, 2))));
        repo.expect_create().times(0);

        let service = LinkService::new(Arc::new(repo));

        let result = service
            .create(
                "https://example.com".to_string(),
                Some(1),
                Some("taken-alias".to_string()),
                None,
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::AliasConflict { .. }));
    }

    #[tokio::test]
    async fn test_create_retries_generated_collisions() {
        let mut repo = MockLinkRepository::new();

        let mut calls = 0;
        repo.expect_find_by_short_id().returning(move |s| {
            calls += 1;
            if calls == 1 {
                // First candidate collides.
                Ok(Some(owned_link(9, s, 3)))
            } else {
                Ok(None)
            }
        });
        repo.expect_create()
            .times(1)
            .returning(|nl| Ok(stored_link(1, &nl)));

        let service = LinkService::new(Arc::new(repo));

        let link = service
            .create("https://example.com".to_string(), None, None, None)
            .await
            .unwrap();

        assert_eq!(link.short_id.len(), 12);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id().returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(repo));

        let result = service.get("missing").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rename_requires_owner() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .returning(|s| Ok(Some(owned_link(1, s, 1))));
        repo.expect_rename().times(0);

        let service = LinkService::new(Arc::new(repo));

        let result = service
            .rename("mylink", "new-name".to_string(), 99)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_rename_conflict_on_taken_id() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_short_id()
            .withf(|s| s == "mylink")
            .returning(|s| Ok(Some(owned_link(1, s, 1))));
        repo.expect_find_by_short_id()
            .withf(|s| s == "new-name")
            .returning(|s| Ok(Some(owned_link(2, s, 7))));
        repo.expect_rename().times(0);

        let service = LinkService::new(Arc::new(repo));

        let result = service.rename("mylink", "new-name".to_string(), 1).await;
        assert!(matches!(result.unwrap_err(), AppError::AliasConflict { .. }));
    }

    #[tokio::test]
    async fn test_edit_target_per_owner_conflict() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_short_id()
            .returning(|s| Ok(Some(owned_link(1, s, 1))));
        repo.expect_find_by_owner_and_target()
            .withf(|owner, target| *owner == 1 && target == "https://rust-lang.org/")
            .returning(|_, _| Ok(Some(owned_link(2, "other", 1))));
        repo.expect_update_target().times(0);

        let service = LinkService::new(Arc::new(repo));

        let result = service
            .edit_target("mylink", "https://rust-lang.org".to_string(), 1)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::TargetConflict { .. }));
    }

    #[tokio::test]
    async fn test_edit_target_same_link_is_not_a_conflict() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_short_id()
            .returning(|s| Ok(Some(owned_link(1, s, 1))));
        repo.expect_find_by_owner_and_target()
            .returning(|_, _| Ok(Some(owned_link(1, "mylink", 1))));
        repo.expect_update_target()
            .withf(|id, target| *id == 1 && target == "https://rust-lang.org/")
            .times(1)
            .returning(|_, target| {
                let mut link = owned_link(1, "mylink", 1);
                link.target_url = target.to_string();
                Ok(link)
            });

        let service = LinkService::new(Arc::new(repo));

        let link = service
            .edit_target("mylink", "https://rust-lang.org".to_string(), 1)
            .await
            .unwrap();

        assert_eq!(link.target_url, "https://rust-lang.org/");
    }

    #[tokio::test]
    async fn test_set_allow_referrals_rejected_on_referral_link() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_short_id().returning(|s| {
            let parent = owned_link(1, "parent", 1);
            let mut link = stored_link(2, &NewLink::referral(s.to_string(), &parent, 1));
            // The requester owns the referral in this scenario.
            link.owner_id = Some(1);
            Ok(Some(link))
        });
        repo.expect_set_allow_referrals().times(0);

        let service = LinkService::new(Arc::new(repo));

        let result = service.set_allow_referrals("ref1", true, 1).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[test]
    fn test_short_url_building() {
        let repo = MockLinkRepository::new();
        let service = LinkService::new(Arc::new(repo));

        assert_eq!(
            service.short_url("https://rl.ink/", "abc123"),
            "https://rl.ink/abc123"
        );
        assert_eq!(
            service.short_url("https://rl.ink", "abc123"),
            "https://rl.ink/abc123"
        );
    }
}
