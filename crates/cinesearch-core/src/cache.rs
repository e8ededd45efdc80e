//! Keyed request cache with in-flight deduplication
//!
//! Each key owns a once-cell. Concurrent callers for the same key share one
//! fetch; a successful value is kept for the session. Failures are not
//! cached, so a later call for the key fetches again.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;

/// Session-lifetime cache of fetched values
///
/// Unbounded: one entry per distinct key until invalidated or cleared.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, if a fetch for it has completed
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached value, or run `fetch` once for every waiting caller
    ///
    /// While a fetch for `key` is in flight, further callers wait for it
    /// instead of starting their own.
    ///
    /// # Errors
    /// Whatever `fetch` returns; the error is not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(key.clone()).or_default())
        };
        cell.get_or_try_init(fetch).await.cloned()
    }

    /// Drop the entry for `key`; returns whether one existed
    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of keys with a completed value
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    /// Whether no key has a completed value
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OmdbError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_or_fetch_caches_success() {
        let cache: QueryCache<String, u32> = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(&"k".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&"k".to_string()).await, Some(42));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache: Arc<QueryCache<u32, u32>> = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |cache: Arc<QueryCache<u32, u32>>, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_fetch(&1, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(7)
                })
                .await
        };

        let (a, b) = tokio::join!(
            fetch(Arc::clone(&cache), Arc::clone(&calls)),
            fetch(Arc::clone(&cache), Arc::clone(&calls)),
        );

        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: QueryCache<u32, u32> = QueryCache::new();

        let first = cache
            .get_or_fetch(&1, || async { Err(OmdbError::Status(500)) })
            .await;
        assert!(first.is_err());
        assert_eq!(cache.get(&1).await, None);

        let second = cache.get_or_fetch(&1, || async { Ok(3) }).await;
        assert_eq!(second.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache: QueryCache<u32, u32> = QueryCache::new();
        cache.get_or_fetch(&1, || async { Ok(1) }).await.unwrap();
        cache.get_or_fetch(&2, || async { Ok(2) }).await.unwrap();

        assert!(cache.invalidate(&1).await);
        assert!(!cache.invalidate(&1).await);
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
