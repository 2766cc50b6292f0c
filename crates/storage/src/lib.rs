pub mod backend;
pub mod cache;
pub mod decode;
pub mod error;
pub mod memory;
pub mod redis_store;

pub use backend::{build_store, KeyValueStore};
pub use cache::{ExecutionCacheStore, LedgerStats, MergeOutcome};
pub use decode::Decoded;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
