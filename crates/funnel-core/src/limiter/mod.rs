//! Funnel limiter - the lock, load, infuse, save cycle against shared storage.

mod config;
mod guard;

pub use config::LimiterConfig;
pub use guard::LockGuard;

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::domain::Funnel;
use crate::error::{LimiterError, Result};
use crate::ports::{Clock, DistributedLock, KeyValueStore, SystemClock};

/// Leaky-bucket rate limiter whose state lives in a shared store.
///
/// Every decision for a key runs under that key's distributed lock, so any
/// number of processes sharing the same store and lock service enforce one
/// consistent limit.
pub struct FunnelLimiter {
    store: Arc<dyn KeyValueStore>,
    lock: Arc<dyn DistributedLock>,
    clock: Arc<dyn Clock>,
    config: LimiterConfig,
}

impl FunnelLimiter {
    /// Create a limiter reading time from the system clock.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        lock: Arc<dyn DistributedLock>,
        config: LimiterConfig,
    ) -> Self {
        Self {
            store,
            lock,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Check whether one unit of work is allowed for `key`.
    ///
    /// Returns `Ok(false)` both when the funnel is empty and when another
    /// caller currently holds the key's lock. An `Err` from a failed save
    /// means the decision was computed but not recorded.
    pub async fn is_allowed(&self, key: &str, rate: f64, capacity: u64) -> Result<bool> {
        self.is_allowed_n(key, rate, capacity, 1).await
    }

    /// Like [`FunnelLimiter::is_allowed`], consuming `units` at once.
    pub async fn is_allowed_n(
        &self,
        key: &str,
        rate: f64,
        capacity: u64,
        units: u64,
    ) -> Result<bool> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(LimiterError::InvalidRate(rate));
        }

        let lock_name = self.config.lock_key(key);
        let Some(guard) = LockGuard::acquire(self.lock.clone(), lock_name).await? else {
            debug!(key = %key, "Funnel busy, denying");
            return Ok(false);
        };

        let outcome = self.infuse_locked(key, rate, capacity, units).await;

        if let Err(e) = guard.release().await {
            warn!(key = %key, error = %e, "Failed to release funnel lock");
        }

        outcome
    }

    /// Read the stored funnel for `key` without locking or mutating it.
    pub async fn snapshot(&self, key: &str) -> Result<Option<Funnel>> {
        self.load(&self.config.state_key(key)).await
    }

    async fn infuse_locked(&self, key: &str, rate: f64, capacity: u64, units: u64) -> Result<bool> {
        let state_key = self.config.state_key(key);
        let now = self.clock.now();

        let mut funnel = match self.load(&state_key).await? {
            Some(mut funnel) => {
                // Callers own the configuration; a shrunk capacity caps the stored quota.
                funnel.capacity = capacity;
                funnel.rate = rate;
                funnel.quota = funnel.quota.min(capacity);
                funnel
            }
            None => {
                debug!(key = %key, capacity, rate, "Creating new funnel");
                Funnel::new(capacity, rate, now)
            }
        };

        let allowed = funnel.infuse(units, now);
        self.save(&state_key, &funnel).await?;

        trace!(
            key = %key,
            allowed,
            quota = funnel.quota,
            capacity = funnel.capacity,
            "Funnel decision"
        );

        Ok(allowed)
    }

    async fn load(&self, state_key: &str) -> Result<Option<Funnel>> {
        let Some(bytes) = self
            .store
            .get(state_key)
            .await
            .map_err(LimiterError::StoreRead)?
        else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(LimiterError::Decode)
    }

    async fn save(&self, state_key: &str, funnel: &Funnel) -> Result<()> {
        let bytes = serde_json::to_vec(funnel).map_err(LimiterError::Encode)?;

        self.store
            .set(state_key, &bytes, self.config.state_ttl)
            .await
            .map_err(LimiterError::StoreWrite)
    }
}
