//! In-memory visit event for asynchronous recording.

use chrono::{DateTime, Utc};

/// Raw material for one visit record, captured on the redirect hot path and
/// handed to the background worker over a bounded channel.
///
/// Enrichment (user-agent parsing, geolocation) happens in the worker so the
/// redirect response never waits on it. If the channel is full the event is
/// dropped; the authoritative click count simply loses one best-effort row.
#[derive(Debug, Clone)]
pub struct VisitEvent {
    pub link_id: i64,
    pub short_id: String,
    pub occurred_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl VisitEvent {
    pub fn new(
        link_id: i64,
        short_id: String,
        ip_address: String,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            short_id,
            occurred_at: Utc::now(),
            ip_address,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_captures_metadata() {
        let event = VisitEvent::new(
            7,
            "abc123".to_string(),
            "192.168.1.1".to_string(),
            Some("Mozilla/5.0"),
            Some("https://news.ycombinator.com/"),
        );

        assert_eq!(event.link_id, 7);
        assert_eq!(event.short_id, "abc123");
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_event_minimal() {
        let event = VisitEvent::new(1, "x".to_string(), "10.0.0.1".to_string(), None, None);
        assert!(event.user_agent.is_none());
        assert!(event.referer.is_none());
    }
}
