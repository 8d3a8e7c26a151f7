//! # Funnel Infrastructure
//!
//! Concrete implementations of the ports defined in `funnel-core`:
//! key-value stores and distributed locks, plus the wiring that turns them
//! into a [`FunnelLimiter`](funnel_core::FunnelLimiter).
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `redis` - Redis store and lock

pub mod backend;
pub mod lock;
pub mod store;


// Re-exports - In-Memory
pub use backend::{BackendError, Backends, limiter_from_env};
pub use lock::InMemoryLock;
pub use store::InMemoryStore;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use lock::{RedisLock, RedisLockConfig};
#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisStore};
