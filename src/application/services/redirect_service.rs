//! Redirect resolver: the read path of the service.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// A resolved live target plus what the handler needs for caching and visit
/// recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub link_id: i64,
    pub target_url: String,
    /// Seconds until the link expires; `None` when it never does. Cache
    /// writes clamp their TTL to this so an entry cannot outlive its link.
    pub remaining_seconds: Option<u64>,
}

/// Outcome of resolving a short id.
///
/// Suspended and expired links are terminal notice states, not errors; the
/// handler turns them into notice redirects rather than error responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    NotFound,
    Suspended,
    Expired,
    Target(ResolvedTarget),
}

/// Resolves short ids against the database.
pub struct RedirectService<L: LinkRepository> {
    links: Arc<L>,
}

impl<L: LinkRepository> RedirectService<L> {
    pub fn new(links: Arc<L>) -> Self {
        Self { links }
    }

    /// Resolves a short id to one of the four redirect outcomes.
    pub async fn resolve(&self, short_id: &str) -> Result<RedirectOutcome, AppError> {
        let Some(link) = self.links.find_by_short_id(short_id).await? else {
            return Ok(RedirectOutcome::NotFound);
        };

        if link.is_suspended {
            debug!(short_id, "redirect hit suspended link");
            return Ok(RedirectOutcome::Suspended);
        }

        let now = Utc::now();

        if link.is_expired(now) {
            debug!(short_id, "redirect hit expired link");
            return Ok(RedirectOutcome::Expired);
        }

        let remaining_seconds = link
            .expires_at
            .map(|expires| (expires - now).num_seconds().max(0) as u64);

        Ok(RedirectOutcome::Target(ResolvedTarget {
            link_id: link.id,
            target_url: link.target_url,
            remaining_seconds,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Link;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Duration;

    fn live_link(short_id: &str) -> Link {
        let now = Utc::now();
        Link {
            id: 1,
            short_id: short_id.to_string(),
            target_url: "https://example.com/page".to_string(),
            owner_id: Some(1),
            is_referral: false,
            root_link_id: None,
            referrer_id: None,
            allow_referrals: false,
            is_suspended: false,
            expires_at: Some(now + Duration::days(10)),
            total_clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_resolve_live_link() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_short_id()
            .returning(|s| Ok(Some(live_link(s))));

        let service = RedirectService::new(Arc::new(links));

        match service.resolve("abc123").await.unwrap() {
            RedirectOutcome::Target(resolved) => {
                assert_eq!(resolved.link_id, 1);
                assert_eq!(resolved.target_url, "https://example.com/page");
                let remaining = resolved.remaining_seconds.unwrap();
                // Ten days out, give or take the test's own runtime.
                assert!(remaining > 863_000 && remaining <= 864_000);
            }
            other => panic!("expected Target, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_link_without_expiry_has_no_ttl_bound() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_short_id().returning(|s| {
            let mut link = live_link(s);
            link.expires_at = None;
            Ok(Some(link))
        });

        let service = RedirectService::new(Arc::new(links));

        match service.resolve("abc123").await.unwrap() {
            RedirectOutcome::Target(resolved) => {
                assert_eq!(resolved.remaining_seconds, None);
            }
            other => panic!("expected Target, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_unknown_short_id() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_short_id().returning(|_| Ok(None));

        let service = RedirectService::new(Arc::new(links));

        let outcome = service.resolve("missing").await.unwrap();
        assert_eq!(outcome, RedirectOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_suspended_link() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_short_id().returning(|s| {
            let mut link = live_link(s);
            link.is_suspended = true;
            Ok(Some(link))
        });

        let service = RedirectService::new(Arc::new(links));

        let outcome = service.resolve("abc123").await.unwrap();
        assert_eq!(outcome, RedirectOutcome::Suspended);
    }

    #[tokio::test]
    async fn test_resolve_expired_link() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_short_id().returning(|s| {
            let mut link = live_link(s);
            link.expires_at = Some(Utc::now() - Duration::hours(1));
            Ok(Some(link))
        });

        let service = RedirectService::new(Arc::new(links));

        let outcome = service.resolve("abc123").await.unwrap();
        assert_eq!(outcome, RedirectOutcome::Expired);
    }
}
