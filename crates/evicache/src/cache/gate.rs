//! The single exclusive section guarding cache state
//!
//! Blocking and async callers acquire the same `tokio::sync::Mutex`, so
//! there is exactly one critical section regardless of how a caller reached
//! it. Blocking acquisition tries the lock first and only parks the thread
//! (via `futures::executor::block_on`) when the section is busy.
//!
//! Blocking acquisition from inside a single-threaded runtime while an async
//! caller on the same thread holds the guard will deadlock. Use the async
//! methods from async code.

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::error::{CacheError, CacheResult};

pub(crate) type GateGuard<'a, T> = MutexGuard<'a, T>;

#[derive(Debug)]
pub(crate) struct Gate<T> {
    inner: Mutex<T>,
}

impl<T> Gate<T> {
    pub(crate) fn new(value: T) -> Self {
        Self { inner: Mutex::new(value) }
    }

    /// Exclusive access without locking; the borrow proves no guard exists
    pub(crate) fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Acquire from synchronous code, parking the thread while busy
    pub(crate) fn lock_blocking(&self) -> GateGuard<'_, T> {
        match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(_) => futures::executor::block_on(self.inner.lock()),
        }
    }

    /// Acquire from async code; dropping the future abandons the wait
    pub(crate) async fn lock(&self) -> GateGuard<'_, T> {
        self.inner.lock().await
    }

    /// Acquire from async code unless `token` is cancelled first
    pub(crate) async fn lock_cancellable(
        &self,
        token: &CancellationToken,
        operation: &str,
    ) -> CacheResult<GateGuard<'_, T>> {
        if token.is_cancelled() {
            return Err(CacheError::cancelled(operation));
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CacheError::cancelled(operation)),
            guard = self.inner.lock() => Ok(guard),
        }
    }
}
