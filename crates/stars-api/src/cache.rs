use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

struct CacheEntry<V> {
    outcome: V,
    /// `None` when `now + ttl` does not fit in an `Instant`
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// A map whose entries expire a fixed time after they were written.
///
/// Expired entries are dropped lazily when they are looked up, or in bulk via
/// [`TtlCache::purge_expired`]. Time is read from the tokio clock.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.outcome.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: K, outcome: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .lock()
            .insert(key, CacheEntry { outcome, expires_at });
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn put_then_get_returns_the_value() {
        let cache = TtlCache::new();
        cache.put("https://example.com/".to_string(), true, Duration::from_secs(60));

        assert_eq!(cache.get("https://example.com/"), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = TtlCache::new();
        cache.put("key".to_string(), false, Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("key"), Some(false));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("key"), None);
        assert!(cache.is_empty(), "expired entry should be evicted on access");
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_resets_expiry() {
        let cache = TtlCache::new();
        cache.put("key".to_string(), false, Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.put("key".to_string(), true, Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("key"), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired_entries() {
        let cache = TtlCache::new();
        cache.put("short".to_string(), 1, Duration::from_secs(1));
        cache.put("long".to_string(), 2, Duration::from_secs(100));
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_ttl_never_expires() {
        let cache = TtlCache::new();
        cache.put("key".to_string(), 7, Duration::MAX);
        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;

        assert_eq!(cache.get("key"), Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_do_not_corrupt_the_map() {
        let cache = Arc::new(TtlCache::new());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.put(format!("url-{}", i % 8), i, Duration::from_secs(60));
                    cache.get(&format!("url-{}", i % 8))
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        assert_eq!(cache.len(), 8);
    }
}
