//! Pure aggregation engine for the link dashboard.
//!
//! Every function here is a stateless fold over visit records supplied in
//! insertion order. Ordering matters: all tie-breaks are defined as "first
//! encountered", so callers must pass visits ordered by ascending id and
//! referral rollups ordered by referral creation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::entities::Visit;

/// Default truncation for top-N distributions.
pub const TOP_N_DEFAULT: usize = 5;
/// Referrer distributions keep more entries than the field distributions.
pub const TOP_N_REFERRERS: usize = 10;

/// One value of a distribution with its click count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistEntry {
    pub value: String,
    pub count: u64,
}

/// Clicks and distinct visitors for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub clicks: u64,
    pub unique_visitors: u64,
}

/// One country's share of total clicks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryShare {
    pub country: String,
    pub clicks: u64,
    /// Percentage of all visits, rounded to one decimal place.
    pub percent: f64,
}

/// Per-referral-link rollup input.
///
/// `clicks` must come from a fresh visit count, never from the denormalized
/// `total_clicks` counter, to avoid drift.
#[derive(Debug, Clone)]
pub struct ReferralClicks {
    pub link_id: i64,
    pub short_id: String,
    /// Display name of the account that created the referral.
    pub referrer_name: String,
    pub clicks: u64,
}

/// The complete statistics bundle for one root link.
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatistics {
    /// Fresh visit count for the root link itself.
    pub total_clicks: u64,
    /// Distinct IP addresses across all of the root's visits.
    pub unique_visitors: u64,
    pub most_clicked_ip: Option<String>,
    pub browsers: Vec<DistEntry>,
    pub operating_systems: Vec<DistEntry>,
    pub devices: Vec<DistEntry>,
    pub countries: Vec<DistEntry>,
    pub cities: Vec<DistEntry>,
    /// Referral clicks keyed by the referral creator's display name.
    pub referrers: Vec<DistEntry>,
    pub daily: Vec<DailyBucket>,
    pub peak_day: Option<DailyBucket>,
    pub average_daily_clicks: f64,
    pub country_breakdown: Vec<CountryShare>,
    /// Sum of every referral link's own visit count.
    pub total_referral_clicks: u64,
    /// Root visits plus referral visits.
    pub total_overall_clicks: u64,
}

/// Builds a distribution over one visit field, preserving first-encounter
/// order of the values.
///
/// Visits where the extractor yields `None` are omitted entirely; they are
/// *not* counted as "unknown". The literal string `"unknown"` (the parser
/// sentinel) counts like any other value.
pub fn distribution<F>(visits: &[Visit], extract: F) -> Vec<DistEntry>
where
    F: Fn(&Visit) -> Option<&str>,
{
    let mut entries: Vec<DistEntry> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for visit in visits {
        let Some(value) = extract(visit) else {
            continue;
        };

        match index.get(value) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(value.to_string(), entries.len());
                entries.push(DistEntry {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    entries
}

/// Most frequent value of a field across all visits.
///
/// Ties break to the value first encountered in insertion order; the fold
/// only replaces the leader on a strictly greater count.
pub fn most_frequent<F>(visits: &[Visit], extract: F) -> Option<String>
where
    F: Fn(&Visit) -> Option<&str>,
{
    let entries = distribution(visits, extract);

    let mut best: Option<&DistEntry> = None;
    for entry in &entries {
        match best {
            Some(leader) if entry.count <= leader.count => {}
            _ => best = Some(entry),
        }
    }

    best.map(|e| e.value.clone())
}

/// Truncates a distribution to its `n` highest counts.
///
/// The sort is stable and compares counts only, so equal counts keep their
/// first-encounter order.
pub fn top_n(mut entries: Vec<DistEntry>, n: usize) -> Vec<DistEntry> {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
}

/// Groups visits into UTC calendar-day buckets with per-day distinct-IP
/// visitor counts. Buckets appear in first-encounter order, which is
/// chronological when visits arrive in insertion order.
pub fn daily_buckets(visits: &[Visit]) -> Vec<DailyBucket> {
    let mut buckets: Vec<DailyBucket> = Vec::new();
    let mut index: std::collections::HashMap<NaiveDate, usize> = std::collections::HashMap::new();
    let mut day_ips: Vec<std::collections::HashSet<&str>> = Vec::new();

    for visit in visits {
        let date = visit.visited_at.date_naive();

        let i = match index.get(&date) {
            Some(&i) => i,
            None => {
                index.insert(date, buckets.len());
                buckets.push(DailyBucket {
                    date,
                    clicks: 0,
                    unique_visitors: 0,
                });
                day_ips.push(std::collections::HashSet::new());
                buckets.len() - 1
            }
        };

        buckets[i].clicks += 1;
        day_ips[i].insert(visit.ip_address.as_str());
    }

    for (bucket, ips) in buckets.iter_mut().zip(day_ips) {
        bucket.unique_visitors = ips.len() as u64;
    }

    buckets
}

/// The bucket with the most clicks; ties break to the earliest bucket in the
/// fold.
pub fn peak_day(buckets: &[DailyBucket]) -> Option<DailyBucket> {
    let mut best: Option<&DailyBucket> = None;
    for bucket in buckets {
        match best {
            Some(leader) if bucket.clicks <= leader.clicks => {}
            _ => best = Some(bucket),
        }
    }
    best.cloned()
}

/// Total visits divided by the number of distinct day buckets; 0.0 when
/// there are no visits.
pub fn average_daily_clicks(total_clicks: u64, bucket_count: usize) -> f64 {
    if bucket_count == 0 {
        return 0.0;
    }
    total_clicks as f64 / bucket_count as f64
}

/// Country shares as percentages of all visits, one decimal place,
/// descending by count.
pub fn country_breakdown(visits: &[Visit]) -> Vec<CountryShare> {
    let total = visits.len();
    if total == 0 {
        return Vec::new();
    }

    let entries = top_n(
        distribution(visits, |v| v.geo.country.as_deref()),
        usize::MAX,
    );

    entries
        .into_iter()
        .map(|e| CountryShare {
            percent: (e.count as f64 * 1000.0 / total as f64).round() / 10.0,
            country: e.value,
            clicks: e.count,
        })
        .collect()
}

/// Referral clicks folded into a distribution keyed by referrer display
/// name. Two referrals created by the same account merge into one entry.
pub fn referrer_distribution(referrals: &[ReferralClicks]) -> Vec<DistEntry> {
    let mut entries: Vec<DistEntry> = Vec::new();
    let mut index: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

    for referral in referrals {
        match index.get(referral.referrer_name.as_str()) {
            Some(&i) => entries[i].count += referral.clicks,
            None => {
                index.insert(referral.referrer_name.as_str(), entries.len());
                entries.push(DistEntry {
                    value: referral.referrer_name.clone(),
                    count: referral.clicks,
                });
            }
        }
    }

    entries
}

/// Distinct IP addresses across all visits.
pub fn unique_visitors(visits: &[Visit]) -> u64 {
    let mut ips = std::collections::HashSet::new();
    for visit in visits {
        ips.insert(visit.ip_address.as_str());
    }
    ips.len() as u64
}

/// Compiles the full statistics bundle for a root link.
///
/// `visits` are the root's own visits in insertion order; `referrals` carry
/// each referral link's fresh visit count.
pub fn compile_statistics(visits: &[Visit], referrals: &[ReferralClicks]) -> LinkStatistics {
    let total_clicks = visits.len() as u64;
    let daily = daily_buckets(visits);
    let peak = peak_day(&daily);
    let average = average_daily_clicks(total_clicks, daily.len());

    let total_referral_clicks: u64 = referrals.iter().map(|r| r.clicks).sum();

    LinkStatistics {
        total_clicks,
        unique_visitors: unique_visitors(visits),
        most_clicked_ip: most_frequent(visits, |v| Some(v.ip_address.as_str())),
        browsers: top_n(distribution(visits, |v| Some(v.browser.as_str())), TOP_N_DEFAULT),
        operating_systems: top_n(distribution(visits, |v| Some(v.os.as_str())), TOP_N_DEFAULT),
        devices: top_n(distribution(visits, |v| Some(v.device.as_str())), TOP_N_DEFAULT),
        countries: top_n(
            distribution(visits, |v| v.geo.country.as_deref()),
            TOP_N_DEFAULT,
        ),
        cities: top_n(distribution(visits, |v| v.geo.city.as_deref()), TOP_N_DEFAULT),
        referrers: top_n(referrer_distribution(referrals), TOP_N_REFERRERS),
        country_breakdown: country_breakdown(visits),
        average_daily_clicks: average,
        peak_day: peak,
        daily,
        total_referral_clicks,
        total_overall_clicks: total_clicks + total_referral_clicks,
    }
}
