//! Cleanup of values that leave the cache
//!
//! Every value removed from the map passes through a [`Disposer`]. Single
//! removals (explicit remove, eviction, expiry purge, replaced values) are
//! disposed synchronously once the gate is released. The batch removed by
//! `clear` is handed to a background worker: a tokio blocking task when a
//! runtime is available, otherwise a detached thread.
//!
//! A failing disposal is reported to the diagnostic sink and never stops the
//! remaining values from being disposed.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::diagnostics::{CacheEvent, DiagnosticSink};
use crate::error::DisposeError;

/// Values that own a resource needing explicit release
///
/// # Example
/// ```
/// use evicache::{Cache, CacheOptions, Disposable, DisposableDisposer, DisposeError};
///
/// #[derive(Clone)]
/// struct Connection(u32);
///
/// impl Disposable for Connection {
///     fn dispose(self) -> Result<(), DisposeError> {
///         // close the socket here
///         Ok(())
///     }
/// }
///
/// let cache: Cache<&str, Connection> =
///     Cache::builder(CacheOptions::lru(8)).disposer(DisposableDisposer).build().unwrap();
/// cache.put("primary", Connection(1)).unwrap();
/// assert!(cache.remove(&"primary"));
/// ```
pub trait Disposable {
    /// Release the resource
    fn dispose(self) -> Result<(), DisposeError>;
}

/// Strategy applied to each value the cache lets go of
pub trait Disposer<V>: Send + Sync {
    /// Dispose of `value`
    fn dispose(&self, value: V) -> Result<(), DisposeError>;
}

/// Drops values with no further action
#[derive(Debug, Clone, Copy, Default)]
pub struct DropDisposer;

impl<V> Disposer<V> for DropDisposer {
    fn dispose(&self, value: V) -> Result<(), DisposeError> {
        drop(value);
        Ok(())
    }
}

/// Calls [`Disposable::dispose`] on each value
#[derive(Debug, Clone, Copy, Default)]
pub struct DisposableDisposer;

impl<V: Disposable> Disposer<V> for DisposableDisposer {
    fn dispose(&self, value: V) -> Result<(), DisposeError> {
        value.dispose()
    }
}

/// Disposer backed by a closure
pub struct FnDisposer<F> {
    f: F,
}

impl<F> FnDisposer<F> {
    /// Wrap `f`, called once per value leaving the cache
    pub fn new<V>(f: F) -> Self
    where
        F: Fn(V) -> Result<(), DisposeError> + Send + Sync,
    {
        Self { f }
    }
}

impl<F> fmt::Debug for FnDisposer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDisposer").finish_non_exhaustive()
    }
}

impl<V, F> Disposer<V> for FnDisposer<F>
where
    F: Fn(V) -> Result<(), DisposeError> + Send + Sync,
{
    fn dispose(&self, value: V) -> Result<(), DisposeError> {
        (self.f)(value)
    }
}

/// Completion handle for a batch handed to background disposal
///
/// Dropping the handle does not stop the batch.
#[derive(Debug)]
pub struct DisposalHandle {
    removed: usize,
    done: Option<oneshot::Receiver<usize>>,
}

impl DisposalHandle {
    fn ready(removed: usize) -> Self {
        Self { removed, done: None }
    }

    /// Number of entries the originating operation removed
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Block until the batch finishes; returns how many values were disposed
    /// without error
    ///
    /// Returns 0 if the worker stopped without reporting, e.g. a disposer
    /// panicked.
    pub fn wait(self) -> usize {
        match self.done {
            Some(done) => futures::executor::block_on(done).unwrap_or_default(),
            None => 0,
        }
    }

    /// Async counterpart of [`wait`](Self::wait)
    pub async fn join(self) -> usize {
        match self.done {
            Some(done) => done.await.unwrap_or_default(),
            None => 0,
        }
    }
}

/// Disposer plus the sink failures are reported to
pub(crate) struct Disposal<V> {
    disposer: Arc<dyn Disposer<V>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<V> Disposal<V> {
    pub(crate) fn new(disposer: Arc<dyn Disposer<V>>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { disposer, sink }
    }

    /// Dispose values one by one on the calling thread
    pub(crate) fn dispose_now(&self, values: Vec<V>) {
        for value in values {
            dispose_one(self.disposer.as_ref(), self.sink.as_ref(), value);
        }
    }
}

impl<V> Disposal<V>
where
    V: Send + 'static,
{

    /// Hand `values` to a background worker
    pub(crate) fn dispose_in_background(
        &self,
        values: Vec<V>,
        token: CancellationToken,
    ) -> DisposalHandle {
        let removed = values.len();
        if values.is_empty() {
            return DisposalHandle::ready(removed);
        }

        let (tx, rx) = oneshot::channel();
        let disposer = Arc::clone(&self.disposer);
        let sink = Arc::clone(&self.sink);
        let job = move || {
            let disposed = dispose_batch(disposer.as_ref(), sink.as_ref(), values, &token);
            let _ = tx.send(disposed);
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                // Detached; completion is observed through the channel.
                drop(runtime.spawn_blocking(job));
            }
            Err(_) => {
                if let Err(e) = std::thread::Builder::new().name("evicache-disposal".into()).spawn(job)
                {
                    self.sink.record(&CacheEvent::DisposalFailed {
                        error: DisposeError::new(format!("failed to start disposal thread: {e}")),
                    });
                }
            }
        }

        DisposalHandle { removed, done: Some(rx) }
    }
}

fn dispose_one<V>(disposer: &dyn Disposer<V>, sink: &dyn DiagnosticSink, value: V) -> bool {
    match disposer.dispose(value) {
        Ok(()) => true,
        Err(error) => {
            sink.record(&CacheEvent::DisposalFailed { error });
            false
        }
    }
}

fn dispose_batch<V>(
    disposer: &dyn Disposer<V>,
    sink: &dyn DiagnosticSink,
    values: Vec<V>,
    token: &CancellationToken,
) -> usize {
    let total = values.len();
    let mut disposed = 0;

    for (index, value) in values.into_iter().enumerate() {
        if token.is_cancelled() {
            sink.record(&CacheEvent::DisposalCancelled { skipped: total - index });
            break;
        }
        if dispose_one(disposer, sink, value) {
            disposed += 1;
        }
    }

    disposed
}
