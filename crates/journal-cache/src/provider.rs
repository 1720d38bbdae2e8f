//! Store manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use journal_core::config::StoreConfig;
use journal_core::error::AppError;
use journal_core::result::AppResult;
use journal_core::traits::KeyValueStore;

/// Store manager that wraps the configured key-value backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner backend.
    inner: Arc<dyn KeyValueStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis key-value store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisKvStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory key-value store");
                Arc::new(crate::memory::MemoryKvStore::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner: store }
    }

    /// Get a reference to the inner backend.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl KeyValueStore for StoreManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
        ttl: Option<Duration>,
    ) -> AppResult<bool> {
        self.inner.compare_and_swap(key, expected, new, ttl).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
