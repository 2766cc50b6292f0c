//! Redis-backed [`KeyValueStore`] (requires the `redis` feature).
//!
//! When the feature is enabled, uses a `redis::aio::MultiplexedConnection`
//! shared across requests. When disabled, construction fails with a clear
//! message naming the feature.

use std::time::Duration;

use async_trait::async_trait;

use crate::backend::KeyValueStore;
use crate::error::StorageError;

#[cfg(feature = "redis")]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
}

#[cfg(feature = "redis")]
impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[cfg(feature = "redis")]
#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StorageError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        // SET EX rejects 0; a sub-second TTL still gets one second.
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, StorageError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let removed: u64 = conn.del(&keys).await?;
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(not(feature = "redis"))]
#[derive(Debug)]
pub struct RedisStore;

#[cfg(not(feature = "redis"))]
impl RedisStore {
    pub async fn connect(_url: &str) -> Result<Self, StorageError> {
        Err(feature_disabled())
    }
}

#[cfg(not(feature = "redis"))]
fn feature_disabled() -> StorageError {
    StorageError::NotConfigured("Redis cache backend requires the 'redis' Cargo feature".into())
}

#[cfg(not(feature = "redis"))]
#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(feature_disabled())
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StorageError> {
        Err(feature_disabled())
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(feature_disabled())
    }

    async fn delete_pattern(&self, _pattern: &str) -> Result<u64, StorageError> {
        Err(feature_disabled())
    }

    async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
        Err(feature_disabled())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
