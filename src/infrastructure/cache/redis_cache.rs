//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Redis cache for redirect target lookups.
///
/// Uses `ConnectionManager` for connection reuse. All operations are
/// fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and
    /// configures the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "target:".to_string(),
        })
    }

    fn build_key(&self, short_id: &str) -> String {
        format!("{}{}", self.key_prefix, short_id)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_target(&self, short_id: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_id);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(target)) => {
                debug!("Cache HIT: {} -> {}", short_id, target);
                Ok(Some(target))
            }
            Ok(None) => {
                debug!("Cache MISS: {}", short_id);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", short_id, e);
                Ok(None)
            }
        }
    }

    async fn set_target(
        &self,
        short_id: &str,
        target_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = self.build_key(short_id);
        let mut conn = self.client.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        if ttl == 0 {
            // Link lifetime already too short to be worth caching.
            return Ok(());
        }

        match conn.set_ex::<_, _, ()>(&key, target_url, ttl).await {
            Ok(_) => {
                debug!("Cache SET: {} -> {} (TTL: {}s)", short_id, target_url, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", short_id, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, short_id: &str) -> CacheResult<()> {
        let key = self.build_key(short_id);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", short_id);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", short_id, e);
                Ok(())
            }
        }
    }

    async fn invalidate_many(&self, short_ids: &[String]) -> CacheResult<()> {
        if short_ids.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = short_ids.iter().map(|s| self.build_key(s)).collect();
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(keys).await {
            Ok(deleted) => {
                debug!("Cache INVALIDATE batch: {} keys removed", deleted);
                Ok(())
            }
            Err(e) => {
                warn!("Redis batch DEL error: {}", e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
