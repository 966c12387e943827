//! Least-recently-used handler.

use std::fmt;
use std::hash::Hash;

use super::EvictionHandler;
use crate::cache::EvictionPolicy;
use crate::collections::KeyList;

/// Orders keys by recency: most recently used at the head, candidate at the
/// tail. Accesses and updates both count as a use.
pub struct LruHandler<K>
where
    K: Eq + Hash + Clone,
{
    order: KeyList<K>,
}

impl<K> LruHandler<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty handler sized for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { order: KeyList::with_capacity(capacity) }
    }
}

impl<K> Default for LruHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for LruHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruHandler").field("len", &self.order.len()).finish()
    }
}

impl<K> EvictionHandler<K> for LruHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lru
    }

    fn on_access(&mut self, key: &K) {
        self.order.move_to_front(key);
    }

    fn on_insert(&mut self, key: &K) {
        if !self.order.push_front(key.clone()) {
            self.order.move_to_front(key);
        }
    }

    fn on_update(&mut self, key: &K) {
        self.on_access(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.order.remove(key);
    }

    fn clear(&mut self) {
        self.order.clear();
    }

    fn select_candidate(&self) -> Option<K> {
        self.order.back().cloned()
    }

    fn keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}
