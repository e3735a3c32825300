//! Analytics service: assembles the statistics bundle for a root link from
//! stored visits and referral children.

use std::sync::Arc;

use serde_json::json;

use crate::application::aggregation::{self, LinkStatistics, ReferralClicks};
use crate::domain::entities::{Link, Visit};
use crate::domain::repositories::{AccountRepository, LinkRepository, VisitRepository};
use crate::error::AppError;

/// Fallback when a referral's creator account no longer resolves.
const UNKNOWN_REFERRER: &str = "unknown";

pub struct AnalyticsService<L, V, Acc>
where
    L: LinkRepository,
    V: VisitRepository,
    Acc: AccountRepository,
{
    links: Arc<L>,
    visits: Arc<V>,
    accounts: Arc<Acc>,
}

impl<L, V, Acc> AnalyticsService<L, V, Acc>
where
    L: LinkRepository,
    V: VisitRepository,
    Acc: AccountRepository,
{
    pub fn new(links: Arc<L>, visits: Arc<V>, accounts: Arc<Acc>) -> Self {
        Self {
            links,
            visits,
            accounts,
        }
    }

    /// Compiles the statistics bundle for a root link.
    ///
    /// Click figures are recomputed from stored visit rows rather than read
    /// from the denormalized counter, so the report is internally
    /// consistent even when best-effort counter updates were lost.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor_id` owns the link and
    /// [`AppError::Validation`] when the link is a referral (statistics are
    /// reported at the root).
    pub async fn link_statistics(
        &self,
        short_id: &str,
        actor_id: i64,
    ) -> Result<LinkStatistics, AppError> {
        let link = self.find_link(short_id).await?;

        if link.owner_id != Some(actor_id) {
            return Err(AppError::forbidden(
                "Only the link owner may view its statistics",
                json!({ "short_id": short_id }),
            ));
        }

        if link.is_referral {
            return Err(AppError::bad_request(
                "Statistics are reported on root links",
                json!({ "short_id": short_id }),
            ));
        }

        let visits = self.visits.list_for_link(link.id).await?;
        let referrals = self.referral_clicks(&link).await?;

        Ok(aggregation::compile_statistics(&visits, &referrals))
    }

    /// Raw visit rows for a link, insertion-ordered.
    pub async fn visits(&self, short_id: &str, actor_id: i64) -> Result<Vec<Visit>, AppError> {
        let link = self.find_link(short_id).await?;

        if link.owner_id != Some(actor_id) {
            return Err(AppError::forbidden(
                "Only the link owner may view its visits",
                json!({ "short_id": short_id }),
            ));
        }

        self.visits.list_for_link(link.id).await
    }

    /// Per-child referral click counts with resolved creator names.
    async fn referral_clicks(&self, root: &Link) -> Result<Vec<ReferralClicks>, AppError> {
        let children = self.links.find_children(root.id).await?;

        let referrer_ids: Vec<i64> = children.iter().filter_map(|c| c.referrer_id).collect();
        let names = self.accounts.display_names(&referrer_ids).await?;

        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let clicks = self.visits.count_for_link(child.id).await?.max(0) as u64;

            let referrer_name = child
                .referrer_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| UNKNOWN_REFERRER.to_string());

            out.push(ReferralClicks {
                link_id: child.id,
                short_id: child.short_id,
                referrer_name,
                clicks,
            });
        }

        Ok(out)
    }

    async fn find_link(&self, short_id: &str) -> Result<Link, AppError> {
        self.links
            .find_by_short_id(short_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_id": short_id }))
            })
    }
}
