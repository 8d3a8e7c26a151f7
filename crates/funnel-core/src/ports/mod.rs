//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use lock::{DistributedLock, LockError};
pub use store::{KeyValueStore, StoreError};
