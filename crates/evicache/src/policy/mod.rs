//! Eviction handlers
//!
//! Each handler tracks the keys currently in the cache in its own auxiliary
//! structure and nominates an eviction candidate on request. Handlers never
//! see values: the cache store notifies them of inserts, accesses, updates
//! and removals, and consults [`EvictionHandler::select_candidate`] when it
//! needs to free a slot.
//!
//! | Policy | Structure | Candidate |
//! |--------|-----------|-----------|
//! | LRU | [`KeyList`](crate::collections::KeyList), MRU at head | tail |
//! | LFU | frequency map + ordered frequency buckets | head of lowest bucket |
//! | FIFO | [`KeyList`](crate::collections::KeyList), oldest at head | head |
//! | NoEviction | membership set | never |
//!
//! Nominating a candidate does not remove it. The store removes the key (and
//! calls [`EvictionHandler::on_remove`]) only after confirming it is still
//! present.

mod fifo;
mod lfu;
mod lru;
mod no_eviction;

use std::hash::Hash;

pub use fifo::FifoHandler;
pub use lfu::LfuHandler;
pub use lru::LruHandler;
pub use no_eviction::NoEvictionHandler;

use crate::cache::EvictionPolicy;

/// Bookkeeping contract shared by every eviction policy
pub trait EvictionHandler<K> {
    /// The policy this handler implements
    fn policy(&self) -> EvictionPolicy;

    /// A present key was read
    fn on_access(&mut self, key: &K);

    /// A new key entered the cache
    fn on_insert(&mut self, key: &K);

    /// A present key had its value replaced
    fn on_update(&mut self, key: &K);

    /// A key left the cache (removal, eviction, purge)
    fn on_remove(&mut self, key: &K);

    /// Forget every key
    fn clear(&mut self);

    /// Nominate the key to evict next, without removing it
    fn select_candidate(&self) -> Option<K>;

    /// Tracked keys in handler-defined order
    fn keys(&self) -> Vec<K>;

    /// Number of tracked keys
    fn len(&self) -> usize;

    /// Returns `true` when no keys are tracked
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this handler can ever nominate a candidate
    fn can_evict(&self) -> bool {
        true
    }
}

/// Closed set of eviction handlers selected by [`EvictionPolicy`]
#[derive(Debug)]
pub enum PolicyHandler<K>
where
    K: Eq + Hash + Clone,
{
    /// Least recently used
    Lru(LruHandler<K>),
    /// Least frequently used
    Lfu(LfuHandler<K>),
    /// First in, first out
    Fifo(FifoHandler<K>),
    /// Hard capacity ceiling
    NoEviction(NoEvictionHandler<K>),
}

impl<K> PolicyHandler<K>
where
    K: Eq + Hash + Clone,
{
    /// Build the handler for `policy`, pre-sized for `capacity` keys
    pub fn new(policy: EvictionPolicy, capacity: usize) -> Self {
        match policy {
            EvictionPolicy::Lru => Self::Lru(LruHandler::with_capacity(capacity)),
            EvictionPolicy::Lfu => Self::Lfu(LfuHandler::with_capacity(capacity)),
            EvictionPolicy::Fifo => Self::Fifo(FifoHandler::with_capacity(capacity)),
            EvictionPolicy::NoEviction => {
                Self::NoEviction(NoEvictionHandler::with_capacity(capacity))
            }
        }
    }

    fn inner(&self) -> &dyn EvictionHandler<K> {
        match self {
            Self::Lru(handler) => handler,
            Self::Lfu(handler) => handler,
            Self::Fifo(handler) => handler,
            Self::NoEviction(handler) => handler,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EvictionHandler<K> {
        match self {
            Self::Lru(handler) => handler,
            Self::Lfu(handler) => handler,
            Self::Fifo(handler) => handler,
            Self::NoEviction(handler) => handler,
        }
    }
}

impl<K> EvictionHandler<K> for PolicyHandler<K>
where
    K: Eq + Hash + Clone,
{
    fn policy(&self) -> EvictionPolicy {
        self.inner().policy()
    }

    fn on_access(&mut self, key: &K) {
        self.inner_mut().on_access(key);
    }

    fn on_insert(&mut self, key: &K) {
        self.inner_mut().on_insert(key);
    }

    fn on_update(&mut self, key: &K) {
        self.inner_mut().on_update(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.inner_mut().on_remove(key);
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn select_candidate(&self) -> Option<K> {
        self.inner().select_candidate()
    }

    fn keys(&self) -> Vec<K> {
        self.inner().keys()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn can_evict(&self) -> bool {
        self.inner().can_evict()
    }
}
