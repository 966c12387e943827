//! Read-only views of cache contents and counters

use std::fmt;
use std::hash::Hash;

use super::config::{CacheOptions, EvictionPolicy};
use super::core::{Cache, Session};
use super::metadata::ItemMetadata;
use super::stats::CacheStats;
use crate::clock::Clock;
use crate::error::{CacheError, CacheResult};
use crate::policy::EvictionHandler;

impl<K, V, C> Session<'_, K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Live keys in handler order; expired entries are purged first
    pub(super) fn keys(&mut self) -> Vec<K> {
        self.purge_expired();
        self.state.handler.keys()
    }

    pub(super) fn snapshot(&mut self) -> Vec<(K, V)> {
        let keys = self.keys();
        keys.into_iter()
            .filter_map(|key| {
                let value = self.state.items.get(&key)?.value.clone();
                Some((key, value))
            })
            .collect()
    }

    pub(super) fn metadata(&mut self, key: &K) -> Option<ItemMetadata> {
        if !self.is_live(key) {
            return None;
        }
        self.state.items.get(key).map(|item| item.metadata)
    }

    pub(super) fn count(&self) -> usize {
        self.state.items.len()
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    /// Keys in eviction-handler order
    ///
    /// LRU lists most recently used first, LFU ascending frequency, FIFO
    /// oldest first. NoEviction order is unspecified.
    pub fn keys(&self) -> Vec<K> {
        self.run(|session| session.keys())
    }

    /// Key/value pairs in the same order as [`keys`](Self::keys), excluding
    /// expired entries
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.run(|session| session.snapshot())
    }

    /// Metadata of a live entry
    ///
    /// Does not count as an access.
    pub fn metadata(&self, key: &K) -> CacheResult<ItemMetadata> {
        self.try_metadata(key).ok_or_else(|| CacheError::not_found(key))
    }

    /// Metadata of a live entry, if any
    pub fn try_metadata(&self, key: &K) -> Option<ItemMetadata> {
        self.run(|session| session.metadata(key))
    }

    /// Number of stored entries (expired entries not yet purged included)
    pub fn count(&self) -> usize {
        self.run(|session| session.count())
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.inner.options.capacity
    }

    /// Configured eviction policy
    pub fn policy(&self) -> EvictionPolicy {
        self.inner.options.eviction_policy
    }

    /// Options the cache was built with
    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    /// Reads that found a live entry
    pub fn hits(&self) -> u64 {
        self.inner.metrics.hits()
    }

    /// Reads that found nothing or an expired entry
    pub fn misses(&self) -> u64 {
        self.inner.metrics.misses()
    }

    /// Live entries removed to make room
    pub fn evictions(&self) -> u64 {
        self.inner.metrics.evictions()
    }

    /// Expired entries purged so far
    pub fn expirations(&self) -> u64 {
        self.inner.metrics.expirations()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let size = self.count();
        self.inner.metrics.snapshot(size, self.capacity(), self.policy())
    }
}
