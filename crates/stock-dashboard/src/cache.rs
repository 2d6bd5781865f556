//! Session cache for fetched data
//!
//! Price histories and news pages are kept for their configured TTL so that
//! moving between pages in one session does not hit the network again.

use cached::{Cached, TimedCache};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Identity of one fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Ticker symbol or source URL
    pub subject: String,
    /// Kind of data fetched
    pub endpoint: String,
    /// Request parameters serialized as JSON
    pub params: String,
}

impl CacheKey {
    pub fn new(subject: impl Into<String>, endpoint: impl Into<String>, params: impl Serialize) -> Self {
        Self {
            subject: subject.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// TTL cache shared between tasks
pub struct FetchCache<V> {
    entries: Arc<RwLock<TimedCache<CacheKey, V>>>,
}

impl<V: Clone> FetchCache<V> {
    /// Entries expire `ttl` after they are inserted
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Live entry for `key`
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        // TimedCache evicts expired entries on lookup, so reads need the write lock
        self.entries.write().await.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: V) {
        let _ = self.entries.write().await.cache_set(key, value);
    }

    /// Cached value for `key`, or the result of `fetcher`
    ///
    /// Only successful fetches are stored; an error is returned as-is.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(subject = %key.subject, endpoint = %key.endpoint, "cache hit");
            return Ok(value);
        }
        tracing::debug!(subject = %key.subject, endpoint = %key.endpoint, "cache miss");

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        let _ = self.entries.write().await.cache_remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.cache_clear();
    }

    /// Number of stored entries, expired ones included until evicted
    pub async fn len(&self) -> usize {
        self.entries.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_creation() {
        let key = CacheKey::new("AAPL", "history", serde_json::json!({"range": "1y"}));
        assert_eq!(key.subject, "AAPL");
        assert_eq!(key.endpoint, "history");
        assert!(key.params.contains("1y"));
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = FetchCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "history", ());

        cache.insert(key.clone(), vec![1.0, 2.0]).await;

        assert_eq!(cache.get(&key).await, Some(vec![1.0, 2.0]));
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch() {
        let cache = FetchCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "history", ());

        let mut call_count = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(150.0) }
            })
            .await
            .unwrap();
        assert_eq!(result, 150.0);
        assert_eq!(call_count, 1);

        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(0.0) }
            })
            .await
            .unwrap();
        assert_eq!(result, 150.0);
        assert_eq!(call_count, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache: FetchCache<f64> = FetchCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "history", ());

        let result = cache
            .get_or_fetch(key.clone(), || async { Err::<f64, _>("offline") })
            .await;
        assert_eq!(result, Err("offline"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_invalidation_and_clear() {
        let cache = FetchCache::new(Duration::from_secs(60));

        for i in 0..5 {
            let key = CacheKey::new(format!("STOCK{i}"), "history", ());
            cache.insert(key, i).await;
        }
        assert_eq!(cache.len().await, 5);

        let key = CacheKey::new("STOCK0", "history", ());
        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.len().await, 4);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
