//! Cache-aside access to short links.
//!
//! [`CachedLinkStore`] is the single read/write surface the services use for
//! link records. Reads try the look-aside cache first and fall back to the
//! repository; writes go to the repository and then populate the cache.
//! Cache failures of any kind degrade to direct repository access.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::deadline::with_deadline;

/// Deadlines and TTL applied by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// How long a populated cache entry lives.
    pub cache_ttl: Duration,
    /// Deadline for a single cache call.
    pub cache_timeout: Duration,
    /// Deadline for a single repository call.
    pub store_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            cache_timeout: Duration::from_millis(250),
            store_timeout: Duration::from_secs(2),
        }
    }
}

/// Point-in-time copy of the store's cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl CacheStats {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("shortlink_cache_hits_total").increment(1);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("shortlink_cache_misses_total").increment(1);
    }

    fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("shortlink_cache_errors_total").increment(1);
    }

    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Cache key under which the record for `code` is stored.
pub fn cache_key(code: &str) -> String {
    format!("link:{code}")
}

/// Repository plus look-aside cache.
///
/// Only raw records are cached. Whether a record is accessible is decided by
/// the caller on every read, so a cached entry can outlive its link's expiry
/// without ever serving it.
pub struct CachedLinkStore<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    settings: StoreSettings,
    stats: CacheStats,
}

impl<L: LinkRepository + ?Sized> CachedLinkStore<L> {
    pub fn new(repository: Arc<L>, cache: Arc<dyn CacheService>, settings: StoreSettings) -> Self {
        Self {
            repository,
            cache,
            settings,
            stats: CacheStats::default(),
        }
    }

    /// Underlying repository, for reads that must bypass the cache.
    pub fn repository(&self) -> &Arc<L> {
        &self.repository
    }

    pub fn settings(&self) -> StoreSettings {
        self.settings
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Looks up a record by code, cache first.
    ///
    /// A cache hit is returned without touching the repository. On a miss the
    /// repository result is cached (best-effort) before being returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`] if the repository fails or times out.
    /// Cache failures are never returned.
    pub async fn lookup(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let key = cache_key(code);

        if let Some(link) = self.cache_get(&key).await {
            return Ok(Some(link));
        }

        let found = with_deadline(
            "find_by_code",
            self.settings.store_timeout,
            self.repository.find_by_code(code),
        )
        .await??;

        if let Some(link) = &found {
            self.cache_put(&key, link).await;
        }

        Ok(found)
    }

    /// Looks up a record by custom alias after [`Self::lookup`] missed.
    ///
    /// Both lookups share the cache key, so the cache is not read again. A
    /// found record is cached under the alias key.
    ///
    /// # Errors
    ///
    /// Same as [`Self::lookup`].
    pub async fn lookup_alias(&self, alias: &str) -> Result<Option<ShortLink>, AppError> {
        let found = with_deadline(
            "find_by_alias",
            self.settings.store_timeout,
            self.repository.find_by_alias(alias),
        )
        .await??;

        if let Some(link) = &found {
            self.cache_put(&cache_key(alias), link).await;
        }

        Ok(found)
    }

    /// Persists a new record, then populates the cache.
    ///
    /// The write is complete once the repository has accepted it; a failed
    /// cache population is only logged.
    ///
    /// # Errors
    ///
    /// Propagates repository errors ([`AppError::DuplicateCode`], [`AppError::Backend`]).
    pub async fn store(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let link = with_deadline(
            "create",
            self.settings.store_timeout,
            self.repository.create(new_link),
        )
        .await??;

        self.cache_put(&cache_key(&link.code), &link).await;

        Ok(link)
    }

    /// Drops any cached record for `code`. Failures are logged only.
    pub async fn invalidate(&self, code: &str) {
        let key = cache_key(code);

        match with_deadline(
            "cache_delete",
            self.settings.cache_timeout,
            self.cache.delete(&key),
        )
        .await
        {
            Ok(Ok(())) => debug!(code, "Cache entry invalidated"),
            Ok(Err(e)) => {
                self.stats.error();
                warn!(code, error = %e, "Cache invalidation failed");
            }
            Err(e) => {
                self.stats.error();
                warn!(code, error = %e, "Cache invalidation failed");
            }
        }
    }

    pub async fn cache_healthy(&self) -> bool {
        with_deadline(
            "cache_health",
            self.settings.cache_timeout,
            self.cache.health_check(),
        )
        .await
        .unwrap_or(false)
    }

    async fn cache_get(&self, key: &str) -> Option<ShortLink> {
        let bytes = match with_deadline("cache_get", self.settings.cache_timeout, self.cache.get(key))
            .await
        {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                self.stats.miss();
                debug!(key, "Cache MISS");
                return None;
            }
            Ok(Err(e)) => {
                self.stats.error();
                warn!(key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
            Err(e) => {
                self.stats.error();
                warn!(key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_slice::<ShortLink>(&bytes) {
            Ok(link) => {
                self.stats.hit();
                debug!(key, "Cache HIT");
                Some(link)
            }
            Err(e) => {
                self.stats.error();
                warn!(key, error = %e, "Undecodable cache entry, falling back to store");
                None
            }
        }
    }

    async fn cache_put(&self, key: &str, link: &ShortLink) {
        let bytes = match serde_json::to_vec(link) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize link for cache");
                return;
            }
        };

        match with_deadline(
            "cache_set",
            self.settings.cache_timeout,
            self.cache.set(key, &bytes, self.settings.cache_ttl),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.error();
                warn!(key, error = %e, "Cache population failed");
            }
            Err(e) => {
                self.stats.error();
                warn!(key, error = %e, "Cache population failed");
            }
        }
    }
}
