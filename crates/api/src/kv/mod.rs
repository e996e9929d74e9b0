//! Key-value store seam backing the session index and rate-limit counters.
//!
//! Production uses [`RedisStore`]; tests and local runs without Redis use
//! [`InMemoryStore`].

use std::time::Duration;

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryStore;
pub use self::redis::RedisStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("stored value for '{key}' is not a counter")]
    NotACounter { key: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set `key` to `value`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Delete `key`. Returns `true` if it existed.
    async fn del(&self, key: &str) -> Result<bool, StoreError>;

    /// Increment the counter at `key` and return the new value. A counter
    /// created by this call expires after `ttl`; existing counters keep
    /// their expiry.
    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> Result<u64, StoreError>;

    /// Round-trip to confirm the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
