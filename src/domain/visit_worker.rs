//! Background worker that enriches and persists visit events.
//!
//! Consumes [`VisitEvent`]s from the bounded channel, parses the user agent,
//! performs a timeout-bounded geolocation lookup, persists the visit with a
//! short retry, then bumps the link's display counter best-effort. Nothing
//! here ever propagates back to the redirect that produced the event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

use crate::domain::entities::{GeoInfo, NewVisit};
use crate::domain::geo::GeoProvider;
use crate::domain::repositories::{LinkRepository, VisitRepository};
use crate::domain::visit_event::VisitEvent;
use crate::utils::user_agent::parse_user_agent;

/// Persistence retry: two more attempts, 200ms apart.
const RETRY_MILLIS: u64 = 200;
const RETRY_ATTEMPTS: usize = 2;

/// Runs the visit worker until the channel closes.
pub async fn run_visit_worker<V, L>(
    mut rx: mpsc::Receiver<VisitEvent>,
    visits: Arc<V>,
    links: Arc<L>,
    geo: Arc<dyn GeoProvider>,
    geo_timeout: Duration,
) where
    V: VisitRepository,
    L: LinkRepository,
{
    while let Some(event) = rx.recv().await {
        process_event(event, visits.as_ref(), links.as_ref(), geo.as_ref(), geo_timeout).await;
    }

    debug!("visit worker shutting down: channel closed");
}

async fn process_event<V, L>(
    event: VisitEvent,
    visits: &V,
    links: &L,
    geo: &dyn GeoProvider,
    geo_timeout: Duration,
) where
    V: VisitRepository,
    L: LinkRepository,
{
    let ua = parse_user_agent(event.user_agent.as_deref());

    let geo_info = match timeout(geo_timeout, geo.lookup(&event.ip_address)).await {
        Ok(Some(info)) => info,
        Ok(None) => GeoInfo::default(),
        Err(_) => {
            debug!(provider = geo.name(), ip = %event.ip_address, "geo lookup timed out");
            metrics::counter!("relink_geo_timeouts_total").increment(1);
            GeoInfo::default()
        }
    };

    let new_visit = NewVisit {
        link_id: event.link_id,
        visited_at: event.occurred_at,
        ip_address: event.ip_address,
        user_agent: event.user_agent,
        device: ua.device,
        browser: ua.browser,
        os: ua.os,
        referer: event.referer,
        geo: geo_info,
    };

    let strategy = FixedInterval::from_millis(RETRY_MILLIS).take(RETRY_ATTEMPTS);
    let record = Retry::spawn(strategy, || visits.record(new_visit.clone())).await;

    match record {
        Ok(_) => {
            metrics::counter!("relink_visits_recorded_total").increment(1);

            // Display counter only; visit rows stay authoritative.
            if let Err(e) = links.increment_clicks(event.link_id).await {
                debug!(link_id = event.link_id, error = %e, "click counter bump failed");
            }
        }
        Err(e) => {
            metrics::counter!("relink_visits_failed_total").increment(1);
            warn!(link_id = event.link_id, error = %e, "failed to persist visit");
        }
    }
}
