//! PostgreSQL implementation of the visit store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{GeoInfo, NewVisit, Visit};
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

const VISIT_COLUMNS: &str = "id, link_id, visited_at, ip_address, user_agent, device, browser, \
     os, referer, country, country_code, city, continent, region, latitude, longitude, \
     timezone, isp";

/// Flat row shape; geolocation columns fold into [`GeoInfo`].
#[derive(sqlx::FromRow)]
struct VisitRow {
    id: i64,
    link_id: i64,
    visited_at: DateTime<Utc>,
    ip_address: String,
    user_agent: Option<String>,
    device: String,
    browser: String,
    os: String,
    referer: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    city: Option<String>,
    continent: Option<String>,
    region: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    isp: Option<String>,
}

impl From<VisitRow> for Visit {
    fn from(r: VisitRow) -> Self {
        Visit {
            id: r.id,
            link_id: r.link_id,
            visited_at: r.visited_at,
            ip_address: r.ip_address,
            user_agent: r.user_agent,
            device: r.device,
            browser: r.browser,
            os: r.os,
            referer: r.referer,
            geo: GeoInfo {
                country: r.country,
                country_code: r.country_code,
                city: r.city,
                continent: r.continent,
                region: r.region,
                latitude: r.latitude,
                longitude: r.longitude,
                timezone: r.timezone,
                isp: r.isp,
            },
        }
    }
}

/// PostgreSQL repository for visit rows.
pub struct PgVisitRepository {
    pool: Arc<PgPool>,
}

impl PgVisitRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn record(&self, new_visit: NewVisit) -> Result<Visit, AppError> {
        let sql = format!(
            "INSERT INTO visits (link_id, visited_at, ip_address, user_agent, device, browser, \
             os, referer, country, country_code, city, continent, region, latitude, longitude, \
             timezone, isp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {VISIT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, VisitRow>(&sql)
            .bind(new_visit.link_id)
            .bind(new_visit.visited_at)
            .bind(&new_visit.ip_address)
            .bind(&new_visit.user_agent)
            .bind(&new_visit.device)
            .bind(&new_visit.browser)
            .bind(&new_visit.os)
            .bind(&new_visit.referer)
            .bind(&new_visit.geo.country)
            .bind(&new_visit.geo.country_code)
            .bind(&new_visit.geo.city)
            .bind(&new_visit.geo.continent)
            .bind(&new_visit.geo.region)
            .bind(new_visit.geo.latitude)
            .bind(new_visit.geo.longitude)
            .bind(&new_visit.geo.timezone)
            .bind(&new_visit.geo.isp)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn list_for_link(&self, link_id: i64) -> Result<Vec<Visit>, AppError> {
        // Insertion order; the aggregation engine's tie-breaks depend on it.
        let sql = format!(
            "SELECT {VISIT_COLUMNS} FROM visits WHERE link_id = $1 ORDER BY id"
        );

        let rows = sqlx::query_as::<_, VisitRow>(&sql)
            .bind(link_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM visits WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
