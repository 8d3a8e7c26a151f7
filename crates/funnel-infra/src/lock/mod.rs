//! Distributed lock implementations.

mod memory;

pub use memory::InMemoryLock;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisLock, RedisLockConfig};
