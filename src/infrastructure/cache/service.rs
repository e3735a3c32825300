//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short id to target URL mappings on the redirect path.
///
/// Only live targets are cached; suspended and expired links are decided
/// against the database, and every lifecycle mutation invalidates the
/// affected short ids. Implementations must be thread-safe and fail open:
/// cache errors degrade to database lookups, never to request failures.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the target URL cached for a short id.
    ///
    /// Returns `Ok(None)` on miss; errors are logged and treated as misses.
    async fn get_target(&self, short_id: &str) -> CacheResult<Option<String>>;

    /// Caches a target URL for a short id.
    ///
    /// Callers clamp `ttl_seconds` to the link's remaining lifetime so a
    /// cached entry can never outlive its link; `None` applies the
    /// implementation's default TTL. Errors are logged and swallowed.
    async fn set_target(
        &self,
        short_id: &str,
        target_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes one cached mapping. Used on rename, target edit, suspension,
    /// expiry change and deletion.
    async fn invalidate(&self, short_id: &str) -> CacheResult<()>;

    /// Removes a batch of cached mappings, e.g. a whole link family after a
    /// cascade or the short ids suspended by an expiration sweep.
    async fn invalidate_many(&self, short_ids: &[String]) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
