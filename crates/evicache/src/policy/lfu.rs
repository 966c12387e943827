//! Least-frequently-used handler.
//!
//! Keys are grouped into buckets by use count. Buckets are kept in ascending
//! frequency order and, within a bucket, in the order keys arrived at that
//! frequency, so the candidate is the earliest key of the lowest populated
//! bucket. Empty buckets are dropped eagerly, which keeps the first bucket
//! non-empty whenever any key is tracked.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use super::EvictionHandler;
use crate::cache::EvictionPolicy;
use crate::collections::KeyList;

/// Frequency-ordered eviction with insertion-order tie-break.
pub struct LfuHandler<K>
where
    K: Eq + Hash + Clone,
{
    frequencies: HashMap<K, u64>,
    buckets: BTreeMap<u64, KeyList<K>>,
}

impl<K> LfuHandler<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty handler sized for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { frequencies: HashMap::with_capacity(capacity), buckets: BTreeMap::new() }
    }

    /// Current use count of `key`, if tracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.frequencies.get(key).copied()
    }

    fn append_to_bucket(&mut self, frequency: u64, key: K) {
        self.buckets.entry(frequency).or_default().push_back(key);
    }

    fn detach_from_bucket(&mut self, frequency: u64, key: &K) {
        if let Some(bucket) = self.buckets.get_mut(&frequency) {
            bucket.remove(key);
            if bucket.is_empty() {
                self.buckets.remove(&frequency);
            }
        }
    }

    fn bump(&mut self, key: &K) {
        let Some(frequency) = self.frequencies.get_mut(key) else {
            self.on_insert(key);
            return;
        };
        let old = *frequency;
        let new = old.saturating_add(1);
        *frequency = new;

        self.detach_from_bucket(old, key);
        self.append_to_bucket(new, key.clone());
    }
}

impl<K> Default for LfuHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for LfuHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuHandler")
            .field("len", &self.frequencies.len())
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

impl<K> EvictionHandler<K> for LfuHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lfu
    }

    fn on_access(&mut self, key: &K) {
        self.bump(key);
    }

    fn on_insert(&mut self, key: &K) {
        if let Some(previous) = self.frequencies.insert(key.clone(), 1) {
            self.detach_from_bucket(previous, key);
        }
        self.append_to_bucket(1, key.clone());
    }

    fn on_update(&mut self, key: &K) {
        self.bump(key);
    }

    fn on_remove(&mut self, key: &K) {
        if let Some(frequency) = self.frequencies.remove(key) {
            self.detach_from_bucket(frequency, key);
        }
    }

    fn clear(&mut self) {
        self.frequencies.clear();
        self.buckets.clear();
    }

    fn select_candidate(&self) -> Option<K> {
        self.buckets.values().next().and_then(KeyList::front).cloned()
    }

    fn keys(&self) -> Vec<K> {
        self.buckets.values().flat_map(KeyList::iter).cloned().collect()
    }

    fn len(&self) -> usize {
        self.frequencies.len()
    }
}
