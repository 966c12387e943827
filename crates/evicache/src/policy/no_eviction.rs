//! Handler for caches that must never evict.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use super::EvictionHandler;
use crate::cache::EvictionPolicy;

/// Tracks membership only. It never nominates a candidate, so a full cache
/// rejects new keys with `CacheFull`.
pub struct NoEvictionHandler<K>
where
    K: Eq + Hash + Clone,
{
    keys: HashSet<K>,
}

impl<K> NoEvictionHandler<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty handler sized for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { keys: HashSet::with_capacity(capacity) }
    }
}

impl<K> Default for NoEvictionHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for NoEvictionHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoEvictionHandler").field("len", &self.keys.len()).finish()
    }
}

impl<K> EvictionHandler<K> for NoEvictionHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::NoEviction
    }

    fn on_access(&mut self, _key: &K) {}

    fn on_insert(&mut self, key: &K) {
        self.keys.insert(key.clone());
    }

    fn on_update(&mut self, _key: &K) {}

    fn on_remove(&mut self, key: &K) {
        self.keys.remove(key);
    }

    fn clear(&mut self) {
        self.keys.clear();
    }

    fn select_candidate(&self) -> Option<K> {
        None
    }

    fn keys(&self) -> Vec<K> {
        self.keys.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn can_evict(&self) -> bool {
        false
    }
}
