//! In-memory key-value store - single-process stand-in for Redis.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use funnel_core::ports::{KeyValueStore, StoreError};

struct StoreEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory store using a HashMap with async RwLock.
///
/// Note: State is per-process and lost on restart, so limits are not shared
/// across instances.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of entries held, including ones that expired but were not purged yet.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };

        if entry.is_expired() {
            drop(entries);
            let mut entries = self.entries.write().await;
            // Re-check: a writer may have refreshed it in between.
            if entries.get(key).is_some_and(StoreEntry::is_expired) {
                entries.remove(key);
            }
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        entries.insert(
            key.to_string(),
            StoreEntry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryStore::new();
        store
            .set("key1", b"value1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("key1").await.unwrap(), Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = InMemoryStore::new();
        store
            .set("key1", b"value1", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("key1").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryStore::new();
        store
            .set("short", b"a", Duration::from_millis(10))
            .await
            .unwrap();
        store
            .set("long", b"b", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }
}
