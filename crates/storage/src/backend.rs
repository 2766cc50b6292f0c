use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use ares_core::config::CacheConfig;

use crate::error::StorageError;
use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;

/// Best-effort key-value substrate holding opaque (JSON text) values.
///
/// Implementations make no atomicity promises across calls. Callers own
/// any read-modify-write sequencing.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key matching a Redis-style glob (`*`, `?`).
    /// Returns the number of keys removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Backend name for logs and status endpoints.
    fn name(&self) -> &'static str;
}

/// Build the configured store backend.
///
/// Returns an error if the backend name is unknown or the backend's Cargo
/// feature is not enabled.
pub async fn build_store(config: &CacheConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Cache: in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "redis" => {
            let store = RedisStore::connect(&config.redis_url).await?;
            info!("Cache: redis store at {}", config.redis_url);
            Ok(Arc::new(store))
        }
        other => Err(StorageError::NotConfigured(format!(
            "unknown cache backend '{}' (supported: memory, redis)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_memory_store_by_default() {
        let store = build_store(&CacheConfig::default()).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn rejects_unknown_backend() {
        let config = CacheConfig {
            backend: "memcached".into(),
            ..CacheConfig::default()
        };
        let err = build_store(&config).await.err().unwrap().to_string();
        assert!(err.contains("memcached"), "unexpected error: {}", err);
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn redis_without_feature_names_the_feature() {
        let config = CacheConfig {
            backend: "redis".into(),
            ..CacheConfig::default()
        };
        let err = build_store(&config).await.err().unwrap().to_string();
        assert!(err.contains("'redis' Cargo feature"), "should mention feature gate: {}", err);
    }
}
