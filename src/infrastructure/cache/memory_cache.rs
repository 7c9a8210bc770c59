//! In-process cache backed by `moka`.

use std::time::{Duration, Instant};

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::debug;

/// Entry bound used by [`MemoryCache::new`].
pub const DEFAULT_MAX_ENTRIES: u64 = 100_000;

/// Longest lifetime a single entry may ask for.
const MAX_ENTRY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Clone)]
struct Entry {
    value: Vec<u8>,
    ttl: Duration,
}

/// Expires each entry after the ttl it was stored with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache kept in process memory with a ttl per entry and a bounded size.
///
/// Expired entries are evicted by moka's housekeeping whether or not they are
/// read again. Suitable for single-instance deployments and tests; nothing is
/// shared between processes.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        debug!(max_entries, "Using MemoryCache");
        Self { inner }
    }

    /// Number of live entries, after pending evictions have been applied.
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_vec(),
            ttl: ttl.min(MAX_ENTRY_TTL),
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();

        cache
            .set("link:abc", b"payload", Duration::from_secs(60))
            .await
            .unwrap();

        let value = cache.get("link:abc").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"payload"[..]));
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = MemoryCache::new();
        assert!(cache.get("link:nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_served() {
        let cache = MemoryCache::new();

        cache
            .set("link:abc", b"payload", Duration::ZERO)
            .await
            .unwrap();

        assert!(cache.get("link:abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unread_expired_entries_are_evicted() {
        let cache = MemoryCache::new();

        for i in 0..1000 {
            cache
                .set(&format!("link:{i}"), b"payload", Duration::from_millis(1))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache
            .set("link:fresh", b"payload", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_accepted() {
        let cache = MemoryCache::new();

        cache.set("k", b"v", Duration::MAX).await.unwrap();
        cache.set("k", b"w", Duration::from_secs(u64::MAX)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"w"[..]));
    }

    #[tokio::test]
    async fn test_size_is_bounded() {
        let cache = MemoryCache::with_max_entries(10);

        for i in 0..200 {
            cache
                .set(&format!("link:{i}"), b"payload", Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert!(cache.entry_count().await <= 10);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();

        cache
            .set("link:abc", b"payload", Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete("link:abc").await.unwrap();
        cache.delete("link:never-set").await.unwrap();

        assert!(cache.get("link:abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_ttl() {
        let cache = MemoryCache::new();

        cache.set("k", b"one", Duration::from_millis(1)).await.unwrap();
        cache.set("k", b"two", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"two"[..]));
    }
}
