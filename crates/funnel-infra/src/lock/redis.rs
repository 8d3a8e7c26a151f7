//! Redis lock implementation using `SET NX PX` with an ownership token.

use std::time::Duration;

use async_trait::async_trait;
use redis::Script;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use funnel_core::ports::{DistributedLock, LockError};

use crate::store::RedisConfig;

/// Redis lock configuration.
#[derive(Debug, Clone)]
pub struct RedisLockConfig {
    /// Redis connection config
    pub redis: RedisConfig,
    /// How long a lock survives if its holder never releases it
    pub lease: Duration,
}

impl Default for RedisLockConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            lease: Duration::from_secs(5),
        }
    }
}

impl RedisLockConfig {
    pub fn from_env() -> Self {
        Self {
            redis: RedisConfig::from_env(),
            lease: Duration::from_millis(
                std::env::var("FUNNEL_LOCK_LEASE_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            ),
        }
    }
}

/// Redis-backed distributed lock.
///
/// Each instance owns a random token; `unlock` only deletes a lock that still
/// carries it, so a lock whose lease expired and was re-taken by another
/// `RedisLock` instance (another process) is left alone. Tasks sharing one
/// instance share its token and are not fenced from each other this way.
pub struct RedisLock {
    conn: ConnectionManager,
    config: RedisLockConfig,
    token: String,
    /// Lua script for compare-and-delete
    release: Script,
}

impl RedisLock {
    pub async fn new(config: RedisLockConfig) -> Result<Self, LockError> {
        let conn = config
            .redis
            .connect()
            .await
            .map_err(|e| LockError::Connection(e.to_string()))?;

        let release = Script::new(
            r#"
            if redis.call('GET', KEYS[1]) == ARGV[1] then
                return redis.call('DEL', KEYS[1])
            end
            return 0
            "#,
        );

        tracing::info!(
            url = %config.redis.url,
            lease_ms = config.lease.as_millis() as u64,
            "Connected to Redis lock"
        );

        Ok(Self {
            conn,
            config,
            token: Uuid::new_v4().to_string(),
            release,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, LockError> {
        Self::new(RedisLockConfig::from_env()).await
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn try_lock(&self, name: &str) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();
        let lease_ms = (self.config.lease.as_millis() as u64).max(1);

        // Replies OK when set, nil when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(name)
            .arg(&self.token)
            .arg("NX")
            .arg("PX")
            .arg(lease_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::Operation(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn unlock(&self, name: &str) -> Result<(), LockError> {
        let mut conn = self.conn.clone();

        let deleted: i64 = self
            .release
            .key(name)
            .arg(&self.token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::Operation(e.to_string()))?;

        if deleted == 0 {
            tracing::debug!(lock = %name, "Lock already released or taken over");
        }

        Ok(())
    }
}
