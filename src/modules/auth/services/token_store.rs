use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Key-value store with passive TTL expiry, used to cache the B2B access token
///
/// Entries are never actively evicted: a read after the TTL has elapsed
/// simply misses.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Value for `key` if present and still within its TTL
    async fn get(&self, key: &str) -> Option<String>;

    /// Insert or overwrite `key` with a fresh TTL
    async fn put(&self, key: &str, value: String, ttl: Duration);

    /// Remove `key` regardless of its age
    async fn forget(&self, key: &str);

    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

/// A cached token and the moment it was written
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub value: String,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedToken {
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// True while the age of the entry is strictly below its TTL
    pub fn is_fresh(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    entries: RwLock<HashMap<String, CachedToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.value.clone())
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CachedToken::new(value, ttl));
    }

    async fn forget(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }
}
