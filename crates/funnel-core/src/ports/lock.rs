//! Distributed lock port.

use async_trait::async_trait;

/// Distributed mutual exclusion keyed by name.
///
/// Acquisition never waits: a held lock is reported as `Ok(false)`.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Try to acquire the lock named `name`.
    /// Returns Ok(true) if acquired, Ok(false) if someone else holds it.
    async fn try_lock(&self, name: &str) -> Result<bool, LockError>;

    /// Release the lock named `name`. Releasing a lock that is not held is a no-op.
    async fn unlock(&self, name: &str) -> Result<(), LockError>;
}

/// Lock backend errors. Contention is not an error.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
