//! In-memory key-value store using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::Op;
use tracing::debug;

use journal_core::config::MemoryStoreConfig;
use journal_core::result::AppResult;
use journal_core::traits::KeyValueStore;

/// A stored value and the TTL it was written with.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    ttl: Option<Duration>,
}

impl StoredValue {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            ttl,
        }
    }
}

/// Expires each entry after the TTL it was last written with.
#[derive(Debug, Clone, Copy)]
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-memory key-value store.
///
/// Suitable for single-process deployments and tests. Expired entries are
/// evicted by moka's housekeeping whether or not they are read again, and
/// compare-and-swap runs as a per-key compute, so it is atomic per key.
#[derive(Debug, Clone)]
pub struct MemoryKvStore {
    /// The underlying moka cache.
    cache: Cache<String, StoredValue>,
}

impl MemoryKvStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        let cache = Cache::builder()
            .initial_capacity(config.initial_capacity)
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.cache.iter().count()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run pending housekeeping now, dropping every expired entry.
    pub async fn evict_expired(&self) {
        self.cache.run_pending_tasks().await;
        debug!(entries = self.cache.entry_count(), "Memory store housekeeping done");
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new(&MemoryStoreConfig::default())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|stored| stored.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), StoredValue::new(value, ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
        ttl: Option<Duration>,
    ) -> AppResult<bool> {
        let mut swapped = false;
        self.cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let matches = current.as_ref().map(|e| e.value().value.as_str()) == expected;
                swapped = matches;
                let op = match (matches, new) {
                    (false, _) => Op::Nop,
                    (true, Some(value)) => Op::Put(StoredValue::new(value, ttl)),
                    (true, None) => Op::Remove,
                };
                std::future::ready(op)
            })
            .await;
        Ok(swapped)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
