use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{KeyValueStore, StoreError};

/// Redis-backed store over a reconnecting, multiplexed connection.
///
/// ```rust,ignore
/// let kv = RedisStore::connect("redis://127.0.0.1:6379").await?;
/// ```
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

/// Redis `EX` wants whole seconds and rejects zero.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl_secs(ttl)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let mut conn = self.manager.clone();
        // SET NX seeds the counter with its expiry; INCR never touches the TTL.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .arg("NX")
            .ignore()
            .incr(key, 1)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
