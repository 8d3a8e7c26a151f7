use async_trait::async_trait;
use std::time::Duration;

/// Key-value store trait - abstraction over the shared state backend (Redis, in-memory).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the raw bytes stored under `key`.
    /// Returns Ok(None) when the key does not exist or has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;
}

/// Store operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Operation failed: {0}")]
    Operation(String),
}
