use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}
