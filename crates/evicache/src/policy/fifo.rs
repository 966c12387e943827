//! First-in, first-out handler.

use std::fmt;
use std::hash::Hash;

use super::EvictionHandler;
use crate::cache::EvictionPolicy;
use crate::collections::KeyList;

/// Orders keys by original insertion: oldest at the head, which is also the
/// candidate. Accesses and updates never reorder.
pub struct FifoHandler<K>
where
    K: Eq + Hash + Clone,
{
    queue: KeyList<K>,
}

impl<K> FifoHandler<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty handler sized for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { queue: KeyList::with_capacity(capacity) }
    }
}

impl<K> Default for FifoHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for FifoHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoHandler").field("len", &self.queue.len()).finish()
    }
}

impl<K> EvictionHandler<K> for FifoHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Fifo
    }

    fn on_access(&mut self, _key: &K) {}

    fn on_insert(&mut self, key: &K) {
        self.queue.push_back(key.clone());
    }

    fn on_update(&mut self, _key: &K) {}

    fn on_remove(&mut self, key: &K) {
        self.queue.remove(key);
    }

    fn clear(&mut self) {
        self.queue.clear();
    }

    fn select_candidate(&self) -> Option<K> {
        self.queue.front().cloned()
    }

    fn keys(&self) -> Vec<K> {
        self.queue.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}
