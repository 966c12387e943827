//! Async facade over the cache
//!
//! Each `_async` method suspends only while waiting for the gate. Once the
//! gate is held it runs the same session code as its blocking twin, so
//! blocking and async callers observe identical semantics and exclude each
//! other.
//!
//! Dropping a pending future abandons the wait without side effects, which
//! is how callers cancel these operations (directly, or through
//! `tokio::select!` or `tokio::time::timeout`). Only
//! [`Cache::clear_async`] takes a [`CancellationToken`], because its work
//! continues after the gate is released: the token is observed while
//! waiting and again between disposals.
//!
//! # Examples
//!
//! ```
//! use evicache::{Cache, CacheOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache: Cache<String, i32> = Cache::new(CacheOptions::lru(100)).unwrap();
//!
//!     cache.put_async("key".to_string(), 42).await.unwrap();
//!     assert_eq!(cache.get_async(&"key".to_string()).await.unwrap(), 42);
//!
//!     let removed = cache.clear_async(&CancellationToken::new()).await.unwrap();
//!     assert_eq!(removed, 1);
//! }
//! ```

use std::fmt;
use std::hash::Hash;

use tokio_util::sync::CancellationToken;

use super::config::ItemOptions;
use super::core::{Cache, Session};
use super::metadata::ItemMetadata;
use crate::clock::Clock;
use crate::error::{CacheError, CacheResult};

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    /// Acquire the gate asynchronously, run `op`, then dispose whatever it
    /// detached
    async fn run_async<R>(&self, op: impl FnOnce(&mut Session<'_, K, V, C>) -> R) -> R {
        let (result, released) = {
            let mut state = self.inner.gate.lock().await;
            self.inner.session(&mut state, op)
        };
        self.inner.disposal.dispose_now(released);
        result
    }

    /// Async [`get`](Self::get)
    pub async fn get_async(&self, key: &K) -> CacheResult<V> {
        self.run_async(|session| session.get(key)).await.ok_or_else(|| CacheError::not_found(key))
    }

    /// Async [`try_get`](Self::try_get)
    pub async fn try_get_async(&self, key: &K) -> Option<V> {
        self.run_async(|session| session.get(key)).await
    }

    /// Async [`contains_key`](Self::contains_key)
    pub async fn contains_key_async(&self, key: &K) -> bool {
        self.run_async(|session| session.is_live(key)).await
    }

    /// Async [`put`](Self::put)
    pub async fn put_async(&self, key: K, value: V) -> CacheResult<()> {
        self.put_with_async(key, value, ItemOptions::default()).await
    }

    /// Async [`put_with`](Self::put_with)
    pub async fn put_with_async(&self, key: K, value: V, options: ItemOptions) -> CacheResult<()> {
        self.run_async(|session| session.put(key, value, options.expiration)).await
    }

    /// Async [`get_or_add`](Self::get_or_add)
    pub async fn get_or_add_async(&self, key: K, value: V) -> CacheResult<V> {
        self.get_or_add_with_async(key, value, ItemOptions::default()).await
    }

    /// Async [`get_or_add_with`](Self::get_or_add_with)
    pub async fn get_or_add_with_async(
        &self,
        key: K,
        value: V,
        options: ItemOptions,
    ) -> CacheResult<V> {
        self.run_async(|session| session.get_or_insert_with(key, || value, options.expiration))
            .await
    }

    /// Async [`add_or_update`](Self::add_or_update)
    pub async fn add_or_update_async(&self, key: K, value: V) -> CacheResult<V> {
        self.add_or_update_with_async(key, value, ItemOptions::default()).await
    }

    /// Async [`add_or_update_with`](Self::add_or_update_with)
    pub async fn add_or_update_with_async(
        &self,
        key: K,
        value: V,
        options: ItemOptions,
    ) -> CacheResult<V> {
        self.run_async(|session| session.add_or_update(key, value, options.expiration)).await
    }

    /// Async [`remove`](Self::remove)
    pub async fn remove_async(&self, key: &K) -> bool {
        self.run_async(|session| session.remove(key)).await
    }

    /// Async [`clear`](Self::clear) honouring `token`
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when `token` fires before the gate is acquired;
    /// the cache is left untouched. Cancelling after the cache was emptied
    /// only stops the background disposal between values.
    pub async fn clear_async(&self, token: &CancellationToken) -> CacheResult<usize> {
        let drained = {
            let mut state = self.inner.gate.lock_cancellable(token, "clear").await?;
            let (drained, _) = self.inner.session(&mut state, |session| session.drain());
            drained
        };
        Ok(self.inner.finish_clear(drained, token.clone()).removed())
    }

    /// Async [`keys`](Self::keys)
    pub async fn keys_async(&self) -> Vec<K> {
        self.run_async(|session| session.keys()).await
    }

    /// Async [`snapshot`](Self::snapshot)
    pub async fn snapshot_async(&self) -> Vec<(K, V)> {
        self.run_async(|session| session.snapshot()).await
    }

    /// Async [`metadata`](Self::metadata)
    pub async fn metadata_async(&self, key: &K) -> CacheResult<ItemMetadata> {
        self.run_async(|session| session.metadata(key))
            .await
            .ok_or_else(|| CacheError::not_found(key))
    }

    /// Async [`count`](Self::count)
    pub async fn count_async(&self) -> usize {
        self.run_async(|session| session.count()).await
    }
}
