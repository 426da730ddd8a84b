//! Key/value cache injected into the service. The in-memory implementation
//! can be swapped for a shared one without touching call sites.

use async_trait::async_trait;
use moka::Expiry;
use serde_json::Value;
use std::time::{Duration, Instant};

const MAX_ENTRIES: u64 = 10_000;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    /// `ttl` of `None` uses the cache's default expiry.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>);
    async fn delete(&self, key: &str) -> bool;
    async fn clear(&self);
}

#[derive(Clone)]
struct Entry {
    value: Value,
    ttl: Option<Duration>,
}

/// Per-entry expiry: the entry's own ttl, else the cache default.
struct EntryExpiry {
    default_ttl: Option<Duration>,
}

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        entry.ttl.or(self.default_ttl)
    }

    // Overwriting a key restarts its clock.
    fn expire_after_update(&self, _key: &String, entry: &Entry, _updated_at: Instant, _remaining: Option<Duration>) -> Option<Duration> {
        entry.ttl.or(self.default_ttl)
    }
}

/// Process-local cache backed by `moka`. A `default_ttl` of `None` keeps
/// entries until deleted or evicted for capacity.
pub struct InMemoryCache {
    entries: moka::future::Cache<String, Entry>,
}

impl InMemoryCache {
    pub fn new(default_ttl: Option<Duration>) -> Self {
        let entries = moka::future::Cache::builder().max_capacity(MAX_ENTRIES).expire_after(EntryExpiry { default_ttl }).build();
        Self { entries }
    }

    /// Live entries after pending evictions have run.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self { Self::new(None) }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).await.map(|e| e.value)
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        self.entries.insert(key.to_string(), Entry { value, ttl }).await;
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).await.is_some()
    }

    async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}
