//! Lifecycle coordinator: suspend/unsuspend, expiry changes, deletion and
//! the expiration sweep, each cascading over a root link and its referral
//! children as one atomic unit.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::info;

use crate::domain::entities::Link;
use crate::domain::repositories::{
    AccountRepository, ArchiveRepository, FamilyDeletion, LinkRepository,
};
use crate::error::AppError;
use crate::utils::password::CredentialVerifier;

/// Coordinates state transitions that must hold across a whole link family.
pub struct LifecycleService<L, Acc, Ar>
where
    L: LinkRepository,
    Acc: AccountRepository,
    Ar: ArchiveRepository,
{
    links: Arc<L>,
    accounts: Arc<Acc>,
    archive: Arc<Ar>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl<L, Acc, Ar> LifecycleService<L, Acc, Ar>
where
    L: LinkRepository,
    Acc: AccountRepository,
    Ar: ArchiveRepository,
{
    pub fn new(
        links: Arc<L>,
        accounts: Arc<Acc>,
        archive: Arc<Ar>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            links,
            accounts,
            archive,
            verifier,
        }
    }

    /// Suspends or unsuspends a link family.
    ///
    /// The operation may be addressed at a referral child; authorization is
    /// re-routed to the root link's owner, and the flag is applied uniformly
    /// to the root and every child in one transaction.
    ///
    /// Returns the root link and the number of links updated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] when `actor_id` does not own the root
    /// and [`AppError::Unauthorized`] when the password does not match.
    pub async fn set_suspended(
        &self,
        short_id: &str,
        suspended: bool,
        actor_id: i64,
        password: &str,
    ) -> Result<(Link, u64), AppError> {
        let root = self.resolve_root(short_id).await?;
        self.authorize(&root, actor_id, password).await?;

        let affected = self.links.set_suspended_family(root.id, suspended).await?;

        info!(
            short_id = %root.short_id,
            suspended,
            affected,
            "link family suspension changed"
        );

        Ok((root, affected))
    }

    /// Applies a signed day-delta to a root link's expiry.
    ///
    /// Positive deltas extend from `max(current expiry, now)`; negative
    /// deltas reduce the current expiry but never below `now + 1 day`. The
    /// new expiry propagates to every referral child, and every affected
    /// link is reactivated, including manually suspended ones.
    ///
    /// Returns the root link (as loaded before the update), the new expiry
    /// and the number of links updated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for referral links (only the root
    /// may be extended) and for a zero delta, and [`AppError::Forbidden`]
    /// for non-owners.
    pub async fn shift_expiry(
        &self,
        short_id: &str,
        delta_days: i64,
        actor_id: i64,
    ) -> Result<(Link, DateTime<Utc>, u64), AppError> {
        if delta_days == 0 {
            return Err(AppError::bad_request(
                "delta_days must be non-zero",
                json!({ "delta_days": 0 }),
            ));
        }

        let link = self.find(short_id).await?;

        if link.is_referral {
            return Err(AppError::bad_request(
                "Referral links cannot be extended directly; extend the root link",
                json!({ "short_id": short_id }),
            ));
        }

        if link.owner_id != Some(actor_id) {
            return Err(AppError::forbidden(
                "Only the link owner may change its expiry",
                json!({ "short_id": short_id }),
            ));
        }

        let now = Utc::now();
        let current = link.expires_at.unwrap_or(now);

        let new_expiry = if delta_days > 0 {
            current.max(now) + Duration::days(delta_days)
        } else {
            // Reductions never land earlier than one day out.
            (current + Duration::days(delta_days)).max(now + Duration::days(1))
        };

        let affected = self.links.set_expiry_family(link.id, new_expiry).await?;

        info!(
            short_id = %link.short_id,
            delta_days,
            new_expiry = %new_expiry,
            affected,
            "link family expiry changed"
        );

        Ok((link, new_expiry, affected))
    }

    /// Deletes a link family: archives the root and every referral child,
    /// removes their visits and removes the links, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] when `actor_id` does not own the root
    /// and [`AppError::Unauthorized`] when the password does not match.
    pub async fn delete(
        &self,
        short_id: &str,
        actor_id: i64,
        password: &str,
    ) -> Result<FamilyDeletion, AppError> {
        let root = self.resolve_root(short_id).await?;
        self.authorize(&root, actor_id, password).await?;

        let outcome = self.links.delete_family(root.id).await?;

        info!(
            short_id = %root.short_id,
            links_archived = outcome.links_archived,
            visits_deleted = outcome.visits_deleted,
            "link family deleted"
        );

        Ok(outcome)
    }

    /// Suspends every active link whose expiry has passed.
    ///
    /// Children are not cascaded here; they carry the same expiry as their
    /// root and are picked up by the same pass. Returns the short ids of
    /// the links that were suspended so callers can invalidate caches.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let swept = self.links.sweep_expired(now).await?;

        if !swept.is_empty() {
            info!(count = swept.len(), "expiration sweep suspended links");
        }

        Ok(swept)
    }

    /// Permanently removes archive rows older than the retention window.
    pub async fn purge_archives(&self, retention_days: i64) -> Result<u64, AppError> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let purged = self.archive.purge_older_than(cutoff).await?;

        if purged > 0 {
            info!(purged, retention_days, "purged expired archive rows");
        }

        Ok(purged)
    }

    async fn find(&self, short_id: &str) -> Result<Link, AppError> {
        self.links
            .find_by_short_id(short_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_id": short_id }))
            })
    }

    /// Resolves the root of the family a short id belongs to.
    async fn resolve_root(&self, short_id: &str) -> Result<Link, AppError> {
        let link = self.find(short_id).await?;

        match link.root_link_id {
            None => Ok(link),
            Some(root_id) => self.links.find_by_id(root_id).await?.ok_or_else(|| {
                AppError::internal(
                    "Referral link has no root",
                    json!({ "short_id": short_id, "root_link_id": root_id }),
                )
            }),
        }
    }

    /// Checks the actor owns the root and re-verifies their password.
    async fn authorize(
        &self,
        root: &Link,
        actor_id: i64,
        password: &str,
    ) -> Result<(), AppError> {
        if root.owner_id != Some(actor_id) {
            return Err(AppError::forbidden(
                "Only the root link owner may perform this operation",
                json!({ "short_id": root.short_id }),
            ));
        }

        let account = self.accounts.find_by_id(actor_id).await?.ok_or_else(|| {
            AppError::unauthorized("Account not found", json!({ "account_id": actor_id }))
        })?;

        if !self.verifier.verify(password, &account.password_hash) {
            return Err(AppError::unauthorized(
                "Password verification failed",
                json!({ "account_id": actor_id }),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, NewLink};
    use crate::domain::repositories::{
        MockAccountRepository, MockArchiveRepository, MockLinkRepository,
    };
    use crate::utils::password::MockCredentialVerifier;

    fn root_link(id: i64, owner: i64) -> Link {
        let now = Utc::now();
        Link {
            id,
            short_id: format!("root{id}"),
            target_url: "https://example.com/".to_string(),
            owner_id: Some(owner),
            is_referral: false,
            root_link_id: None,
            referrer_id: None,
            allow_referrals: true,
            is_suspended: false,
            expires_at: Some(now + Duration::days(30)),
            total_clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn referral_of(root: &Link, id: i64, requester: i64) -> Link {
        let new_link = NewLink::referral(format!("ref{id}"), root, requester);
        let now = Utc::now();
        Link {
            id,
            short_id: new_link.short_id,
            target_url: new_link.target_url,
            owner_id: new_link.owner_id,
            is_referral: true,
            root_link_id: new_link.root_link_id,
            referrer_id: new_link.referrer_id,
            allow_referrals: false,
            is_suspended: new_link.is_suspended,
            expires_at: new_link.expires_at,
            total_clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn account(id: i64) -> Account {
        Account {
            id,
            username: format!("user{id}"),
            display_name: format!("User {id}"),
            password_hash: "stored-hash".to_string(),
            created_at: Utc::now(),
        }
    }

    fn service(
        links: MockLinkRepository,
        accounts: MockAccountRepository,
        verifier: MockCredentialVerifier,
    ) -> LifecycleService<MockLinkRepository, MockAccountRepository, MockArchiveRepository> {
        LifecycleService::new(
            Arc::new(links),
            Arc::new(accounts),
            Arc::new(MockArchiveRepository::new()),
            Arc::new(verifier),
        )
    }

    #[tokio::test]
    async fn test_suspend_on_referral_reroutes_to_root_owner() {
        let mut links = MockLinkRepository::new();
        let root = root_link(1, 10);
        let child = referral_of(&root, 2, 20);

        let child_clone = child.clone();
        links
            .expect_find_by_short_id()
            .withf(|s| s == "ref2")
            .returning(move |_| Ok(Some(child_clone.clone())));
        let root_clone = root.clone();
        links
            .expect_find_by_id()
            .withf(|id| *id == 1)
            .returning(move |_| Ok(Some(root_clone.clone())));
        links
            .expect_set_suspended_family()
            .withf(|root_id, suspended| *root_id == 1 && *suspended)
            .times(1)
            .returning(|_, _| Ok(2));

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .withf(|id| *id == 10)
            .returning(|id| Ok(Some(account(id))));

        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().returning(|_, _| true);

        let service = service(links, accounts, verifier);

        let (resolved, affected) = service
            .set_suspended("ref2", true, 10, "secret")
            .await
            .unwrap();

        assert_eq!(resolved.id, 1);
        assert_eq!(affected, 2);
    }

    #[tokio::test]
    async fn test_suspend_by_child_requester_is_forbidden() {
        let mut links = MockLinkRepository::new();
        let root = root_link(1, 10);
        let child = referral_of(&root, 2, 20);

        let child_clone = child.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(child_clone.clone())));
        let root_clone = root.clone();
        links
            .expect_find_by_id()
            .returning(move |_| Ok(Some(root_clone.clone())));
        links.expect_set_suspended_family().times(0);

        let service = service(links, MockAccountRepository::new(), MockCredentialVerifier::new());

        // Account 20 owns the referral but not the root.
        let result = service.set_suspended("ref2", true, 20, "secret").await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_suspend_rejects_wrong_password() {
        let mut links = MockLinkRepository::new();
        let root = root_link(1, 10);

        let root_clone = root.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(root_clone.clone())));
        links.expect_set_suspended_family().times(0);

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id))));

        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().returning(|_, _| false);

        let service = service(links, accounts, verifier);

        let result = service.set_suspended("root1", true, 10, "wrong").await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_shift_expiry_positive_extends_from_future_expiry() {
        let mut links = MockLinkRepository::new();
        let root = root_link(1, 10);
        let current = root.expires_at.unwrap();

        let root_clone = root.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(root_clone.clone())));
        links
            .expect_set_expiry_family()
            .withf(move |root_id, expiry| {
                *root_id == 1 && *expiry == current + Duration::days(7)
            })
            .times(1)
            .returning(|_, _| Ok(3));

        let service = service(links, MockAccountRepository::new(), MockCredentialVerifier::new());

        let (returned_root, new_expiry, affected) =
            service.shift_expiry("root1", 7, 10).await.unwrap();
        assert_eq!(returned_root.id, 1);
        assert_eq!(new_expiry, current + Duration::days(7));
        assert_eq!(affected, 3);
    }

    #[tokio::test]
    async fn test_shift_expiry_positive_on_lapsed_expiry_starts_from_now() {
        let mut links = MockLinkRepository::new();
        let mut root = root_link(1, 10);
        root.expires_at = Some(Utc::now() - Duration::days(5));

        let root_clone = root.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(root_clone.clone())));
        links
            .expect_set_expiry_family()
            .withf(|_, expiry| {
                let days = (*expiry - Utc::now()).num_days();
                (6..=7).contains(&days)
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let service = service(links, MockAccountRepository::new(), MockCredentialVerifier::new());

        service.shift_expiry("root1", 7, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_shift_expiry_negative_clamps_to_one_day_out() {
        let mut links = MockLinkRepository::new();
        let mut root = root_link(1, 10);
        root.expires_at = Some(Utc::now() + Duration::days(2));

        let root_clone = root.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(root_clone.clone())));
        links
            .expect_set_expiry_family()
            .withf(|_, expiry| {
                let hours = (*expiry - Utc::now()).num_hours();
                (23..=24).contains(&hours)
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let service = service(links, MockAccountRepository::new(), MockCredentialVerifier::new());

        // Reducing by 30 days would land in the past; clamps to now + 1 day.
        service.shift_expiry("root1", -30, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_shift_expiry_rejects_referral_links() {
        let mut links = MockLinkRepository::new();
        let root = root_link(1, 10);
        let child = referral_of(&root, 2, 20);

        let child_clone = child.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(child_clone.clone())));
        links.expect_set_expiry_family().times(0);

        let service = service(links, MockAccountRepository::new(), MockCredentialVerifier::new());

        let result = service.shift_expiry("ref2", 7, 20).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_runs_family_cascade() {
        let mut links = MockLinkRepository::new();
        let root = root_link(1, 10);

        let root_clone = root.clone();
        links
            .expect_find_by_short_id()
            .returning(move |_| Ok(Some(root_clone.clone())));
        links
            .expect_delete_family()
            .withf(|root_id| *root_id == 1)
            .times(1)
            .returning(|_| {
                Ok(FamilyDeletion {
                    links_archived: 3,
                    visits_deleted: 18,
                })
            });

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id))));

        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().returning(|_, _| true);

        let service = service(links, accounts, verifier);

        let outcome = service.delete("root1", 10, "secret").await.unwrap();
        assert_eq!(outcome.links_archived, 3);
        assert_eq!(outcome.visits_deleted, 18);
    }

    #[tokio::test]
    async fn test_sweep_returns_suspended_short_ids() {
        let mut links = MockLinkRepository::new();
        links
            .expect_sweep_expired()
            .times(1)
            .returning(|_| Ok(vec!["a1".to_string(), "b2".to_string()]));

        let service = service(links, MockAccountRepository::new(), MockCredentialVerifier::new());

        let swept = service.sweep_expired(Utc::now()).await.unwrap();
        assert_eq!(swept, vec!["a1", "b2"]);
    }
}
