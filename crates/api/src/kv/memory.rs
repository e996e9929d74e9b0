use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

/// Process-local store for development and tests. Expired entries are
/// invisible to reads and swept out on every write.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
    entries.retain(|_, e| e.is_live(now));
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        sweep(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        sweep(&mut entries, now);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                value: "0".into(),
                expires_at: now + ttl,
            });

        let count: u64 = entry
            .value
            .parse()
            .map_err(|_| StoreError::NotACounter {
                key: key.to_string(),
            })?;
        let count = count + 1;
        entry.value = count.to_string();
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_del() {
        let store = InMemoryStore::new();
        store
            .set_ex("session:a", "42", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("session:a").await.unwrap().as_deref(), Some("42"));

        assert!(store.del("session:a").await.unwrap());
        assert!(!store.del("session:a").await.unwrap());
        assert_eq!(store.get("session:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let store = InMemoryStore::new();
        store
            .set_ex("k", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn counters_increment_and_restart_after_expiry() {
        let store = InMemoryStore::new();
        let ttl = Duration::from_millis(20);
        assert_eq!(store.incr_with_ttl("c", ttl).await.unwrap(), 1);
        assert_eq!(store.incr_with_ttl("c", ttl).await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.incr_with_ttl("c", ttl).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn writes_sweep_expired_keys() {
        let store = InMemoryStore::new();
        let window = Duration::from_millis(10);
        for n in 0..50 {
            store
                .incr_with_ttl(&format!("ratelimit:auth:ip:{n}:0"), window)
                .await
                .unwrap();
        }
        assert_eq!(store.entries.read().await.len(), 50);

        tokio::time::sleep(Duration::from_millis(30)).await;
        store
            .set_ex("session:fresh", "1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.entries.read().await.len(), 1);
    }

    #[tokio::test]
    async fn incrementing_a_non_counter_fails() {
        let store = InMemoryStore::new();
        store
            .set_ex("name", "ketut", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(matches!(
            store.incr_with_ttl("name", Duration::from_secs(60)).await,
            Err(StoreError::NotACounter { .. })
        ));
    }
}
