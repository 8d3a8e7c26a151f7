//! Redis key-value store implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use funnel_core::ports::{KeyValueStore, StoreError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whether to fall back to in-memory backends if Redis is unavailable
    pub fallback_to_memory: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            fallback_to_memory: false,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Open a managed connection, giving up after `connect_timeout`.
    pub(crate) async fn connect(&self) -> Result<ConnectionManager, StoreError> {
        let client =
            Client::open(self.url.as_str()).map_err(|e| StoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        tokio::time::timeout(self.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

/// Redis-backed funnel state store.
///
/// Uses connection manager for automatic reconnection.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn new(config: RedisConfig) -> Result<Self, StoreError> {
        let conn = config.connect().await?;

        tracing::info!(url = %config.url, "Connected to Redis store");

        Ok(Self { conn })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, StoreError> {
        Self::new(RedisConfig::from_env()).await
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        // PX keeps sub-second TTLs; Redis rejects a zero expiry.
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> RedisConfig {
        RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            fallback_to_memory: false,
        }
    }

    async fn get_test_store() -> Option<RedisStore> {
        RedisStore::new(test_config()).await.ok()
    }

    #[tokio::test]
    async fn test_redis_store_set_get() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        let key = "test_funnel_store_key";
        store
            .set(key, b"payload", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(store.get(key).await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(store.get("test_funnel_store_missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_store_ttl() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => return,
        };

        let key = "test_funnel_store_ttl";
        store
            .set(key, b"short-lived", Duration::from_millis(200))
            .await
            .unwrap();
        assert!(store.get(key).await.unwrap().is_some());

        // Wait for expiration
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.get(key).await.unwrap(), None);
    }
}
