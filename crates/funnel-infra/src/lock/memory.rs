//! In-memory lock - single-process stand-in for the Redis lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use funnel_core::ports::{DistributedLock, LockError};

/// In-memory named lock with a lease.
///
/// A lock whose lease ran out counts as free, mirroring the Redis lock's `PX`
/// expiry so a forgotten holder cannot block a key forever.
pub struct InMemoryLock {
    held: Mutex<HashMap<String, Instant>>,
    lease: Duration,
}

impl InMemoryLock {
    pub fn new(lease: Duration) -> Self {
        Self {
            held: Mutex::new(HashMap::new()),
            lease,
        }
    }
}

impl Default for InMemoryLock {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl DistributedLock for InMemoryLock {
    async fn try_lock(&self, name: &str) -> Result<bool, LockError> {
        let mut held = self.held.lock().await;
        let now = Instant::now();

        if held.get(name).is_some_and(|expires_at| *expires_at > now) {
            return Ok(false);
        }

        held.insert(name.to_string(), now + self.lease);
        Ok(true)
    }

    async fn unlock(&self, name: &str) -> Result<(), LockError> {
        self.held.lock().await.remove(name);
        Ok(())
    }
}
