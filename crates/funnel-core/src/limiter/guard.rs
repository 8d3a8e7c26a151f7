//! Scoped distributed lock acquisition.

use std::sync::Arc;

use crate::ports::{DistributedLock, LockError};

/// A held distributed lock.
///
/// Call [`LockGuard::release`] on the normal path. If the guard is dropped
/// without being released (the owning future was cancelled or panicked), the
/// unlock is spawned onto the current tokio runtime.
pub struct LockGuard {
    lock: Arc<dyn DistributedLock>,
    name: String,
    released: bool,
}

impl LockGuard {
    /// Try to take the lock without waiting.
    ///
    /// Returns `Ok(None)` when someone else holds it.
    pub async fn acquire(
        lock: Arc<dyn DistributedLock>,
        name: impl Into<String>,
    ) -> Result<Option<Self>, LockError> {
        let name = name.into();
        if !lock.try_lock(&name).await? {
            return Ok(None);
        }

        Ok(Some(Self {
            lock,
            name,
            released: false,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the lock.
    ///
    /// If this future is dropped before the unlock completes, `Drop` still
    /// schedules one.
    pub async fn release(mut self) -> Result<(), LockError> {
        let result = self.lock.unlock(&self.name).await;
        self.released = true;
        result
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let lock = self.lock.clone();
        let name = std::mem::take(&mut self.name);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = lock.unlock(&name).await {
                        tracing::warn!(lock = %name, error = %e, "Deferred lock release failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(lock = %name, "No runtime to release dropped lock");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct SetLock {
        held: Mutex<HashSet<String>>,
    }

    impl SetLock {
        fn is_held(&self, name: &str) -> bool {
            self.held.lock().unwrap().contains(name)
        }
    }

    #[async_trait]
    impl DistributedLock for SetLock {
        async fn try_lock(&self, name: &str) -> Result<bool, LockError> {
            Ok(self.held.lock().unwrap().insert(name.to_string()))
        }

        async fn unlock(&self, name: &str) -> Result<(), LockError> {
            self.held.lock().unwrap().remove(name);
            Ok(())
        }
    }

    /// First unlock never completes; later ones do.
    #[derive(Default)]
    struct StallingLock {
        inner: SetLock,
        unlock_calls: AtomicUsize,
    }

    #[async_trait]
    impl DistributedLock for StallingLock {
        async fn try_lock(&self, name: &str) -> Result<bool, LockError> {
            self.inner.try_lock(name).await
        }

        async fn unlock(&self, name: &str) -> Result<(), LockError> {
            if self.unlock_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            self.inner.unlock(name).await
        }
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let lock = Arc::new(SetLock::default());

        let guard = LockGuard::acquire(lock.clone(), "a").await.unwrap().unwrap();
        assert_eq!(guard.name(), "a");
        assert!(lock.is_held("a"));

        guard.release().await.unwrap();
        assert!(!lock.is_held("a"));
    }

    #[tokio::test]
    async fn test_acquire_contended_returns_none() {
        let lock = Arc::new(SetLock::default());

        let _first = LockGuard::acquire(lock.clone(), "a").await.unwrap().unwrap();
        let second = LockGuard::acquire(lock.clone(), "a").await.unwrap();

        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_dropped_guard_releases() {
        let lock = Arc::new(SetLock::default());

        let guard = LockGuard::acquire(lock.clone(), "a").await.unwrap().unwrap();
        drop(guard);

        for _ in 0..10 {
            if !lock.is_held("a") {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!lock.is_held("a"));
    }

    #[tokio::test]
    async fn test_cancelled_release_still_unlocks() {
        let lock = Arc::new(StallingLock::default());

        let guard = LockGuard::acquire(lock.clone(), "a").await.unwrap().unwrap();
        let timed_out = tokio::time::timeout(Duration::from_millis(20), guard.release()).await;
        assert!(timed_out.is_err());

        for _ in 0..10 {
            if !lock.inner.is_held("a") {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!lock.inner.is_held("a"));
        assert_eq!(lock.unlock_calls.load(Ordering::SeqCst), 2);
    }
}
