//! Response cache keyed by exact query text.
//!
//! Keys are SHA-256 digests of `namespace \0 query`, so two queries that differ
//! by a single character never share an entry. A cache can be shared across
//! sessions behind an `Arc`.

use std::collections::HashMap;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct QueryCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

/// Cache key for a query within a namespace (e.g. `"serper"`).
pub fn cache_key(namespace: &str, query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(query.as_bytes());
    hex::encode(hasher.finalize())
}

impl<V: Clone> QueryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `query`, if any.
    pub async fn get(&self, namespace: &str, query: &str) -> Option<V> {
        let key = cache_key(namespace, query);
        let entries = self.entries.read().await;
        entries
            .get(&key)
            .filter(|e| e.inserted_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    pub async fn insert(&self, namespace: &str, query: &str, value: V) {
        let key = cache_key(namespace, query);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.inserted_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_exact() {
        let a = cache_key("serper", "invoice frustrated reddit");
        let b = cache_key("serper", "invoice frustrated reddit ");
        let c = cache_key("anthropic", "invoice frustrated reddit");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, cache_key("serper", "invoice frustrated reddit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_insert_and_expiry() {
        let cache = QueryCache::new(Duration::from_secs(60));
        assert!(cache.get("serper", "q").await.is_none());

        cache.insert("serper", "q", vec![1, 2, 3]).await;
        assert_eq!(cache.get("serper", "q").await, Some(vec![1, 2, 3]));
        assert!(cache.get("serper", "Q").await.is_none());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get("serper", "q").await.is_none());
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }
}
