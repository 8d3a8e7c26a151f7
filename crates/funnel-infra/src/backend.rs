//! Limiter wiring - picks Redis or in-memory backends.

use std::sync::Arc;

use funnel_core::ports::{DistributedLock, KeyValueStore, LockError, StoreError};
use funnel_core::{FunnelLimiter, LimiterConfig};

use crate::lock::InMemoryLock;
use crate::store::InMemoryStore;

#[cfg(feature = "redis")]
use crate::lock::{RedisLock, RedisLockConfig};
#[cfg(feature = "redis")]
use crate::store::RedisStore;

/// Errors raised while wiring up limiter backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Lock service unavailable: {0}")]
    Lock(#[from] LockError),
}

/// The store and lock a limiter runs against.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn KeyValueStore>,
    pub lock: Arc<dyn DistributedLock>,
}

impl Backends {
    /// Process-local backends. Limits are not shared across instances.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            lock: Arc::new(InMemoryLock::default()),
        }
    }

    /// Redis backends, falling back to in-memory when Redis is unreachable
    /// and `fallback_to_memory` is set.
    #[cfg(feature = "redis")]
    pub async fn redis(config: RedisLockConfig) -> Result<Self, BackendError> {
        let fallback = config.redis.fallback_to_memory;

        let connected = async {
            let store = RedisStore::new(config.redis.clone()).await?;
            let lock = RedisLock::new(config).await?;
            Ok::<_, BackendError>(Self {
                store: Arc::new(store),
                lock: Arc::new(lock),
            })
        }
        .await;

        match connected {
            Ok(backends) => Ok(backends),
            Err(e) if fallback => {
                tracing::warn!(
                    error = %e,
                    "Redis unavailable. Falling back to in-memory funnels (per-process limits)."
                );
                Ok(Self::in_memory())
            }
            Err(e) => Err(e),
        }
    }

    pub fn into_limiter(self, config: LimiterConfig) -> FunnelLimiter {
        FunnelLimiter::new(self.store, self.lock, config)
    }
}

/// Build a limiter from environment configuration.
///
/// Uses Redis when the `redis` feature is enabled, in-memory backends otherwise.
pub async fn limiter_from_env() -> Result<FunnelLimiter, BackendError> {
    let config = LimiterConfig::from_env();

    #[cfg(feature = "redis")]
    let backends = Backends::redis(RedisLockConfig::from_env()).await?;

    #[cfg(not(feature = "redis"))]
    let backends = {
        tracing::info!("Running without redis feature - using in-memory funnels");
        Backends::in_memory()
    };

    tracing::info!(
        key_prefix = %config.key_prefix,
        state_ttl_secs = config.state_ttl.as_secs(),
        "Funnel limiter initialized"
    );

    Ok(backends.into_limiter(config))
}
