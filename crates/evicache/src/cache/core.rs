//! Core cache implementation
//!
//! All state (the item map and the policy handler's ordering structure)
//! lives behind one [`Gate`]. Each public operation acquires the gate, runs
//! a [`Session`] against the state, releases the gate and only then disposes
//! whatever values the session detached. The async facade in
//! `async_core.rs` runs the very same session code after an async
//! acquisition.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use super::config::{CacheOptions, Expiration, ItemOptions};
use super::diagnostics::{CacheEvent, DiagnosticSink, TracingSink};
use super::disposal::{Disposal, DisposalHandle, Disposer, DropDisposer};
use super::gate::Gate;
use super::metadata::CacheItem;
use super::stats::MetricsCollector;
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, CacheFullReason, CacheResult};
use crate::policy::{EvictionHandler, PolicyHandler};

/// Everything the gate protects
pub(super) struct CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(super) items: HashMap<K, CacheItem<V>>,
    pub(super) handler: PolicyHandler<K>,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(options: &CacheOptions) -> Self {
        Self {
            items: HashMap::with_capacity(options.capacity),
            handler: PolicyHandler::new(options.eviction_policy, options.capacity),
        }
    }
}

/// State shared by every clone of a [`Cache`]
pub(super) struct Inner<K, V, C>
where
    K: Eq + Hash + Clone,
{
    pub(super) gate: Gate<CacheState<K, V>>,
    pub(super) options: CacheOptions,
    pub(super) metrics: MetricsCollector,
    pub(super) clock: C,
    pub(super) sink: Arc<dyn DiagnosticSink>,
    pub(super) disposal: Disposal<V>,
}

/// Thread-safe, capacity-bounded cache with a pluggable eviction policy
///
/// Cloning a `Cache` is cheap and yields a handle to the same storage.
///
/// # Type Parameters
/// - `K`: Key type (`Debug` is used to render keys in errors and diagnostics)
/// - `V`: Value type (must be `Clone`; reads return copies)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use evicache::{Cache, CacheOptions, ItemOptions};
///
/// let cache: Cache<String, i32> = Cache::new(CacheOptions::lfu(100)).unwrap();
/// cache.put("key".to_string(), 42).unwrap();
/// cache
///     .put_with("session".to_string(), 7, ItemOptions::sliding(Duration::from_secs(30)))
///     .unwrap();
///
/// assert_eq!(cache.get(&"key".to_string()).unwrap(), 42);
/// assert!(cache.get(&"missing".to_string()).unwrap_err().is_not_found());
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
{
    pub(super) inner: Arc<Inner<K, V, C>>,
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<K, V, C> fmt::Debug for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("options", &self.inner.options)
            .field("hits", &self.inner.metrics.hits())
            .field("misses", &self.inner.metrics.misses())
            .field("evictions", &self.inner.metrics.evictions())
            .finish_non_exhaustive()
    }
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Create a cache using the system clock, tracing diagnostics and no
    /// disposal beyond drop
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when `options` fail validation.
    pub fn new(options: CacheOptions) -> CacheResult<Self> {
        Self::builder(options).build()
    }

    /// Start configuring a cache
    pub fn builder(options: CacheOptions) -> CacheBuilder<K, V, SystemClock> {
        CacheBuilder::new(options)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing)
    pub fn with_clock(options: CacheOptions, clock: C) -> CacheResult<Self> {
        CacheBuilder::new(options).clock(clock).build()
    }

    /// Acquire the gate from blocking code, run `op`, then dispose whatever
    /// it detached
    pub(super) fn run<R>(&self, op: impl FnOnce(&mut Session<'_, K, V, C>) -> R) -> R {
        let (result, released) = {
            let mut state = self.inner.gate.lock_blocking();
            self.inner.session(&mut state, op)
        };
        self.inner.disposal.dispose_now(released);
        result
    }

    /// Get a value, failing with `NotFound` when absent or expired
    pub fn get(&self, key: &K) -> CacheResult<V> {
        self.run(|session| session.get(key)).ok_or_else(|| CacheError::not_found(key))
    }

    /// Get a value if present and live
    pub fn try_get(&self, key: &K) -> Option<V> {
        self.run(|session| session.get(key))
    }

    /// Check whether a live entry exists without touching hit/miss counters
    ///
    /// An expired entry found here is purged.
    pub fn contains_key(&self, key: &K) -> bool {
        self.run(|session| session.is_live(key))
    }

    /// Insert or replace a value using the default expiration
    ///
    /// # Errors
    ///
    /// Returns `CacheFull` when the key is new, the cache is at capacity and
    /// no slot could be freed.
    pub fn put(&self, key: K, value: V) -> CacheResult<()> {
        self.put_with(key, value, ItemOptions::default())
    }

    /// Insert or replace a value with per-item options
    pub fn put_with(&self, key: K, value: V, options: ItemOptions) -> CacheResult<()> {
        self.run(|session| session.put(key, value, options.expiration))
    }

    /// Return the cached value, or store and return `value` on a miss
    pub fn get_or_add(&self, key: K, value: V) -> CacheResult<V> {
        self.get_or_add_with(key, value, ItemOptions::default())
    }

    /// [`get_or_add`](Self::get_or_add) with per-item options for the miss path
    pub fn get_or_add_with(&self, key: K, value: V, options: ItemOptions) -> CacheResult<V> {
        self.run(|session| session.get_or_insert_with(key, || value, options.expiration))
    }

    /// Get or insert with a generator function
    ///
    /// `f` only runs on a miss. It runs while the gate is held, so it must
    /// not call back into this cache.
    ///
    /// # Example
    /// ```
    /// use evicache::{Cache, CacheOptions};
    ///
    /// let cache: Cache<String, i32> = Cache::new(CacheOptions::lru(100)).unwrap();
    /// let value = cache.get_or_insert_with("key".to_string(), || 42).unwrap();
    /// assert_eq!(value, 42);
    /// ```
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> CacheResult<V>
    where
        F: FnOnce() -> V,
    {
        self.run(|session| session.get_or_insert_with(key, f, None))
    }

    /// Always write `value`, returning it
    ///
    /// Counts as a hit when the key held a live entry, otherwise a miss.
    pub fn add_or_update(&self, key: K, value: V) -> CacheResult<V> {
        self.add_or_update_with(key, value, ItemOptions::default())
    }

    /// [`add_or_update`](Self::add_or_update) with per-item options
    pub fn add_or_update_with(&self, key: K, value: V, options: ItemOptions) -> CacheResult<V> {
        self.run(|session| session.add_or_update(key, value, options.expiration))
    }

    /// Remove a live entry, returning whether one was removed
    pub fn remove(&self, key: &K) -> bool {
        self.run(|session| session.remove(key))
    }

    /// Remove every entry, returning how many were removed
    ///
    /// Removed values are disposed in the background.
    pub fn clear(&self) -> usize {
        self.clear_with_handle().removed()
    }

    /// Like [`clear`](Self::clear), returning a handle to await disposal
    pub fn clear_with_handle(&self) -> DisposalHandle {
        let drained = self.run(|session| session.drain());
        self.inner.finish_clear(drained, CancellationToken::new())
    }

    /// Purge every expired entry now, returning how many were purged
    ///
    /// Purges are counted as expirations, never as evictions.
    pub fn purge_expired(&self) -> usize {
        self.run(|session| session.purge_expired())
    }
}

impl<K, V, C> Inner<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    pub(super) fn session<R>(
        &self,
        state: &mut CacheState<K, V>,
        op: impl FnOnce(&mut Session<'_, K, V, C>) -> R,
    ) -> (R, Vec<V>) {
        let mut session = Session { inner: self, state, now: self.clock.now(), released: Vec::new() };
        let result = op(&mut session);
        (result, session.released)
    }

    pub(super) fn finish_clear(&self, drained: Vec<V>, token: CancellationToken) -> DisposalHandle {
        self.sink.record(&CacheEvent::Cleared { removed: drained.len() });
        self.disposal.dispose_in_background(drained, token)
    }
}

/// Values still stored when the last handle goes away are disposed inline,
/// so they reach the disposer before the drop returns.
impl<K, V, C> Drop for Inner<K, V, C>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        let state = self.gate.get_mut();
        state.handler.clear();
        let remaining: Vec<V> = state.items.drain().map(|(_, item)| item.value).collect();
        if remaining.is_empty() {
            return;
        }

        self.sink.record(&CacheEvent::Cleared { removed: remaining.len() });
        self.disposal.dispose_now(remaining);
    }
}

/// One operation's exclusive view of the cache state
///
/// Time is sampled once per session so every check in an operation agrees
/// on "now". Values leaving the map are parked in `released` and disposed by
/// the caller after the gate is released.
pub(super) struct Session<'a, K, V, C>
where
    K: Eq + Hash + Clone,
{
    pub(super) inner: &'a Inner<K, V, C>,
    pub(super) state: &'a mut CacheState<K, V>,
    pub(super) now: Instant,
    released: Vec<V>,
}

impl<K, V, C> Session<'_, K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Whether `key` maps to a live item; an expired item is purged
    pub(super) fn is_live(&mut self, key: &K) -> bool {
        let expired = match self.state.items.get(key) {
            None => return false,
            Some(item) => item.metadata.is_expired(self.now),
        };
        if expired {
            self.purge(key);
        }
        !expired
    }

    pub(super) fn get(&mut self, key: &K) -> Option<V> {
        if !self.is_live(key) {
            self.inner.metrics.record_miss();
            return None;
        }

        let item = self.state.items.get_mut(key)?;
        item.metadata.register_access(self.now);
        let value = item.value.clone();
        self.state.handler.on_access(key);
        self.inner.metrics.record_hit();
        Some(value)
    }

    pub(super) fn put(
        &mut self,
        key: K,
        value: V,
        expiration: Option<Expiration>,
    ) -> CacheResult<()> {
        if self.is_live(&key) {
            self.update(&key, value, expiration);
            Ok(())
        } else {
            self.insert(key, value, expiration)
        }
    }

    pub(super) fn get_or_insert_with(
        &mut self,
        key: K,
        f: impl FnOnce() -> V,
        expiration: Option<Expiration>,
    ) -> CacheResult<V> {
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }

        let value = f();
        let stored = value.clone();
        self.insert(key, value, expiration)?;
        Ok(stored)
    }

    pub(super) fn add_or_update(
        &mut self,
        key: K,
        value: V,
        expiration: Option<Expiration>,
    ) -> CacheResult<V> {
        let stored = value.clone();
        if self.is_live(&key) {
            self.inner.metrics.record_hit();
            self.update(&key, value, expiration);
        } else {
            self.inner.metrics.record_miss();
            self.insert(key, value, expiration)?;
        }
        Ok(stored)
    }

    pub(super) fn remove(&mut self, key: &K) -> bool {
        if !self.is_live(key) {
            return false;
        }
        self.detach(key)
    }

    /// Empty the map and handler, returning the detached values
    pub(super) fn drain(&mut self) -> Vec<V> {
        self.state.handler.clear();
        self.state.items.drain().map(|(_, item)| item.value).collect()
    }

    pub(super) fn purge_expired(&mut self) -> usize {
        let now = self.now;
        let expired: Vec<K> = self
            .state
            .items
            .iter()
            .filter(|(_, item)| item.metadata.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.purge(key);
        }
        expired.len()
    }

    fn update(&mut self, key: &K, value: V, expiration: Option<Expiration>) {
        if let Some(item) = self.state.items.get_mut(key) {
            let previous = item.replace(value, self.now, expiration);
            self.released.push(previous);
            self.state.handler.on_update(key);
        }
    }

    fn insert(&mut self, key: K, value: V, expiration: Option<Expiration>) -> CacheResult<()> {
        self.ensure_capacity(&key)?;

        let expiration = expiration.unwrap_or(self.inner.options.default_expiration);
        self.state.handler.on_insert(&key);
        self.state.items.insert(key, CacheItem::new(value, self.now, expiration));
        self.inner.metrics.record_insert();
        Ok(())
    }

    /// Free a slot for `key` if the map is full
    ///
    /// Attempts are bounded by the map size on entry. An expired candidate is
    /// purged rather than evicted; the freed slot then satisfies the next
    /// capacity check without touching a live entry.
    fn ensure_capacity(&mut self, key: &K) -> CacheResult<()> {
        let capacity = self.inner.options.capacity;
        if self.state.items.len() < capacity {
            return Ok(());
        }
        if !self.state.handler.can_evict() {
            return Err(self.cache_full(key, CacheFullReason::PolicyNeverEvicts));
        }

        let attempts = self.state.items.len();
        for _ in 0..attempts {
            if self.state.items.len() < capacity {
                return Ok(());
            }

            let Some(candidate) = self.state.handler.select_candidate() else {
                self.inner.sink.record(&CacheEvent::NoCandidate {
                    key: format!("{key:?}"),
                    count: self.state.items.len(),
                });
                return Err(self.cache_full(key, CacheFullReason::NoCandidate));
            };

            let expired = match self.state.items.get(&candidate) {
                Some(item) => item.metadata.is_expired(self.now),
                None => {
                    self.inner
                        .sink
                        .record(&CacheEvent::CandidateMissing { candidate: format!("{candidate:?}") });
                    // Forget the stale key so the next attempt sees a different candidate.
                    self.state.handler.on_remove(&candidate);
                    continue;
                }
            };

            if expired {
                self.purge(&candidate);
                continue;
            }

            self.evict(&candidate);
            return Ok(());
        }

        if self.state.items.len() < capacity {
            return Ok(());
        }
        Err(self.cache_full(key, CacheFullReason::AttemptsExhausted))
    }

    fn cache_full(&self, key: &K, reason: CacheFullReason) -> CacheError {
        CacheError::CacheFull {
            capacity: self.inner.options.capacity,
            key: format!("{key:?}"),
            policy: self.inner.options.eviction_policy,
            reason,
        }
    }

    fn detach(&mut self, key: &K) -> bool {
        let Some(item) = self.state.items.remove(key) else {
            return false;
        };
        self.state.handler.on_remove(key);
        self.released.push(item.value);
        true
    }

    fn purge(&mut self, key: &K) {
        if self.detach(key) {
            self.inner.metrics.record_expiration();
            self.inner.sink.record(&CacheEvent::Purged { key: format!("{key:?}") });
        }
    }

    fn evict(&mut self, key: &K) {
        if self.detach(key) {
            let total_evictions = self.inner.metrics.record_eviction();
            self.inner
                .sink
                .record(&CacheEvent::Evicted { key: format!("{key:?}"), total_evictions });
        }
    }
}

/// Builder for [`Cache`] collaborators
///
/// # Example
/// ```
/// use evicache::{Cache, CacheOptions, FnDisposer, MockClock, NullSink};
///
/// let clock = MockClock::new();
/// let cache: Cache<u32, String, MockClock> = Cache::builder(CacheOptions::fifo(16))
///     .clock(clock.clone())
///     .diagnostics(NullSink)
///     .disposer(FnDisposer::new(|value: String| {
///         drop(value);
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// cache.put(1, "one".to_string()).unwrap();
/// assert_eq!(cache.count(), 1);
/// ```
pub struct CacheBuilder<K, V, C = SystemClock> {
    options: CacheOptions,
    clock: C,
    sink: Option<Arc<dyn DiagnosticSink>>,
    disposer: Option<Arc<dyn Disposer<V>>>,
    _key: PhantomData<fn() -> K>,
}

impl<K, V> CacheBuilder<K, V, SystemClock> {
    /// Start from `options` with the system clock
    pub fn new(options: CacheOptions) -> Self {
        Self { options, clock: SystemClock, sink: None, disposer: None, _key: PhantomData }
    }
}

impl<K, V, C> CacheBuilder<K, V, C> {
    /// Use a different time source
    pub fn clock<C2: Clock>(self, clock: C2) -> CacheBuilder<K, V, C2> {
        CacheBuilder {
            options: self.options,
            clock,
            sink: self.sink,
            disposer: self.disposer,
            _key: PhantomData,
        }
    }

    /// Send diagnostics to `sink` instead of `tracing`
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Share an existing sink
    pub fn diagnostics_arc(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Dispose removed values with `disposer`
    pub fn disposer(mut self, disposer: impl Disposer<V> + 'static) -> Self {
        self.disposer = Some(Arc::new(disposer));
        self
    }
}

impl<K, V, C> CacheBuilder<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    /// Validate the options and create the cache
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` before any state is created when the
    /// options are invalid.
    pub fn build(self) -> CacheResult<Cache<K, V, C>> {
        self.options.validate()?;

        let sink: Arc<dyn DiagnosticSink> = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let disposer: Arc<dyn Disposer<V>> =
            self.disposer.unwrap_or_else(|| Arc::new(DropDisposer));

        sink.record(&CacheEvent::Initialized {
            capacity: self.options.capacity,
            policy: self.options.eviction_policy,
            default_expiration: self.options.default_expiration,
        });

        let inner = Inner {
            gate: Gate::new(CacheState::new(&self.options)),
            options: self.options,
            metrics: MetricsCollector::new(),
            clock: self.clock,
            disposal: Disposal::new(disposer, Arc::clone(&sink)),
            sink,
        };

        Ok(Cache { inner: Arc::new(inner) })
    }
}

impl<K, V, C> fmt::Debug for CacheBuilder<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("options", &self.options)
            .field("custom_sink", &self.sink.is_some())
            .field("custom_disposer", &self.disposer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::core.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::cache::EvictionPolicy;
    use crate::clock::MockClock;
    use crate::error::DisposeError;
    use crate::FnDisposer;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<CacheEvent>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn record(&self, event: &CacheEvent) {
            self.events.lock().push(event.clone());
        }
    }

    fn mock_cache(options: CacheOptions) -> (Cache<u32, u32, MockClock>, MockClock) {
        let clock = MockClock::new();
        let cache = Cache::with_clock(options, clock.clone()).unwrap();
        (cache, clock)
    }

    /// Validates construction-time validation.
    ///
    /// Assertions:
    /// - Ensures zero capacity fails with `InvalidConfiguration`.
    #[test]
    fn test_zero_capacity_rejected() {
        let err = Cache::<u32, u32>::new(CacheOptions::lru(0)).unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfiguration { .. }));
    }

    /// Validates the basic get/put scenario.
    ///
    /// Assertions:
    /// - Confirms hits and misses are counted per lookup.
    #[test]
    fn test_put_get_counts_hits_and_misses() {
        let (cache, _) = mock_cache(CacheOptions::lru(4));
        cache.put(1, 10).unwrap();

        assert_eq!(cache.get(&1).unwrap(), 10);
        assert_eq!(cache.try_get(&2), None);
        assert!(cache.get(&2).unwrap_err().is_not_found());

        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
    }

    /// Validates `contains_key` leaves counters alone.
    ///
    /// Assertions:
    /// - Confirms `hits` and `misses` stay at zero.
    #[test]
    fn test_contains_key_does_not_count() {
        let (cache, _) = mock_cache(CacheOptions::lru(4));
        cache.put(1, 10).unwrap();

        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 0);
    }

    /// Validates the expired candidate scenario in capacity enforcement.
    ///
    /// Assertions:
    /// - Confirms the expired entry is purged, not evicted.
    /// - Confirms the live entry survives.
    #[test]
    fn test_expired_candidate_frees_slot_without_eviction() {
        let (cache, clock) = mock_cache(CacheOptions::lru(2));
        cache.put_with(1, 1, ItemOptions::absolute(Duration::from_millis(10))).unwrap();
        cache.put(2, 2).unwrap();

        clock.advance_millis(20);
        cache.put(3, 3).unwrap();

        assert_eq!(cache.evictions(), 0);
        assert_eq!(cache.expirations(), 1);
        assert!(cache.contains_key(&2));
        assert!(cache.contains_key(&3));
        assert_eq!(cache.count(), 2);
    }

    /// Validates the expired non-candidate scenario.
    ///
    /// Assertions:
    /// - Confirms a live candidate is evicted even when another entry expired.
    #[test]
    fn test_live_candidate_evicted_before_expired_non_candidate() {
        let (cache, clock) = mock_cache(CacheOptions::fifo(2));
        cache.put(1, 1).unwrap();
        cache.put_with(2, 2, ItemOptions::absolute(Duration::from_millis(5))).unwrap();

        clock.advance_millis(10);
        cache.put(3, 3).unwrap();

        assert_eq!(cache.evictions(), 1);
        assert!(!cache.contains_key(&1));
        // 2 is expired and purged on lookup
        assert!(!cache.contains_key(&2));
        assert_eq!(cache.expirations(), 1);
    }

    /// Validates update semantics.
    ///
    /// Assertions:
    /// - Confirms the replaced value is disposed.
    /// - Confirms the count is unchanged.
    #[test]
    fn test_update_disposes_replaced_value() {
        let disposed = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&disposed);
        let cache: Cache<u32, u32> = Cache::builder(CacheOptions::no_eviction(1))
            .disposer(FnDisposer::new(move |value: u32| {
                seen.lock().push(value);
                Ok(())
            }))
            .build()
            .unwrap();

        cache.put(1, 10).unwrap();
        cache.put(1, 11).unwrap();
        assert_eq!(cache.add_or_update(1, 12).unwrap(), 12);

        assert_eq!(*disposed.lock(), vec![10, 11]);
        assert_eq!(cache.count(), 1);
        assert_eq!(cache.get(&1).unwrap(), 12);
    }

    /// Validates `get_or_add` semantics.
    ///
    /// Assertions:
    /// - Confirms the existing value wins and the miss path stores the new one.
    #[test]
    fn test_get_or_add() {
        let (cache, _) = mock_cache(CacheOptions::lru(2));

        assert_eq!(cache.get_or_add(1, 10).unwrap(), 10);
        assert_eq!(cache.get_or_add(1, 99).unwrap(), 10);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    /// Validates the lazy generator only runs on a miss.
    ///
    /// Assertions:
    /// - Confirms `calls` equals `1`.
    #[test]
    fn test_get_or_insert_with_is_lazy() {
        let (cache, _) = mock_cache(CacheOptions::lru(2));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_insert_with(5, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    50
                })
                .unwrap();
            assert_eq!(value, 50);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Validates `add_or_update` hit/miss accounting.
    ///
    /// Assertions:
    /// - Confirms a new key is a miss and an existing key is a hit.
    #[test]
    fn test_add_or_update_counts() {
        let (cache, _) = mock_cache(CacheOptions::lru(2));

        cache.add_or_update(1, 1).unwrap();
        cache.add_or_update(1, 2).unwrap();

        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    /// Validates per-item expiration overriding the default.
    ///
    /// Assertions:
    /// - Confirms the default-rule item outlives the overridden one.
    #[test]
    fn test_item_override_supersedes_default() {
        let options = CacheOptions::builder()
            .capacity(4)
            .absolute_ttl(Duration::from_secs(60))
            .build();
        let (cache, clock) = mock_cache(options);

        cache.put(1, 1).unwrap();
        cache.put_with(2, 2, ItemOptions::absolute(Duration::from_secs(1))).unwrap();
        clock.advance(Duration::from_secs(2));

        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
    }

    /// Validates update keeps the existing rule when no override is given.
    ///
    /// Assertions:
    /// - Confirms the absolute deadline restarts from the update.
    #[test]
    fn test_update_restarts_absolute_ttl() {
        let (cache, clock) = mock_cache(CacheOptions::lru(2));
        cache.put_with(1, 1, ItemOptions::absolute(Duration::from_millis(100))).unwrap();

        clock.advance_millis(80);
        cache.put(1, 2).unwrap();
        clock.advance_millis(80);

        assert_eq!(cache.try_get(&1), Some(2));
    }

    /// Validates `remove` semantics.
    ///
    /// Assertions:
    /// - Confirms removal reports whether anything was removed.
    /// - Ensures an expired entry is treated as absent.
    #[test]
    fn test_remove() {
        let (cache, clock) = mock_cache(CacheOptions::lru(4));
        cache.put(1, 1).unwrap();
        cache.put_with(2, 2, ItemOptions::sliding(Duration::from_millis(1))).unwrap();

        assert!(cache.remove(&1));
        assert!(!cache.remove(&1));

        clock.advance_millis(5);
        assert!(!cache.remove(&2));
        assert_eq!(cache.count(), 0);
        assert_eq!(cache.expirations(), 1);
    }

    /// Validates the explicit expiry sweep.
    ///
    /// Assertions:
    /// - Confirms only expired entries are purged.
    #[test]
    fn test_purge_expired() {
        let (cache, clock) = mock_cache(CacheOptions::lfu(8));
        for key in 0..4 {
            cache.put_with(key, key, ItemOptions::sliding(Duration::from_millis(10))).unwrap();
        }
        cache.put(10, 10).unwrap();

        clock.advance_millis(5);
        cache.get(&0).unwrap();
        clock.advance_millis(8);

        assert_eq!(cache.purge_expired(), 3);
        assert_eq!(cache.count(), 2);
        assert_eq!(cache.evictions(), 0);
    }

    /// Validates the cache-full diagnostics.
    ///
    /// Assertions:
    /// - Confirms the error carries capacity, key, policy and reason.
    #[test]
    fn test_no_eviction_reports_cache_full() {
        let (cache, _) = mock_cache(CacheOptions::no_eviction(1));
        cache.put(1, 1).unwrap();

        match cache.put(2, 2).unwrap_err() {
            CacheError::CacheFull { capacity, key, policy, reason } => {
                assert_eq!(capacity, 1);
                assert_eq!(key, "2");
                assert_eq!(policy, EvictionPolicy::NoEviction);
                assert_eq!(reason, CacheFullReason::PolicyNeverEvicts);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Validates the diagnostic events emitted by core operations.
    ///
    /// Assertions:
    /// - Confirms initialization, eviction and clear events reach the sink.
    #[test]
    fn test_events_reach_sink() {
        let sink = Arc::new(RecordingSink::default());
        let cache: Cache<u32, u32> = Cache::builder(CacheOptions::lru(1))
            .diagnostics_arc(sink.clone())
            .build()
            .unwrap();

        cache.put(1, 1).unwrap();
        cache.put(2, 2).unwrap();
        assert_eq!(cache.clear(), 1);

        let events = sink.events.lock();
        assert!(matches!(events[0], CacheEvent::Initialized { capacity: 1, .. }));
        assert!(matches!(
            events[1],
            CacheEvent::Evicted { ref key, total_evictions: 1 } if key == "1"
        ));
        assert!(matches!(events[2], CacheEvent::Cleared { removed: 1 }));
    }

    /// Validates disposal failures never surface to callers.
    ///
    /// Assertions:
    /// - Ensures `remove` succeeds although the disposer fails.
    /// - Confirms the failure is reported as an event.
    #[test]
    fn test_disposal_failure_is_reported_not_propagated() {
        let sink = Arc::new(RecordingSink::default());
        let cache: Cache<u32, u32> = Cache::builder(CacheOptions::lru(2))
            .diagnostics_arc(sink.clone())
            .disposer(FnDisposer::new(|_: u32| Err(DisposeError::new("boom"))))
            .build()
            .unwrap();

        cache.put(1, 1).unwrap();
        assert!(cache.remove(&1));

        assert!(sink
            .events
            .lock()
            .iter()
            .any(|event| matches!(event, CacheEvent::DisposalFailed { .. })));
    }

    /// Validates teardown of the last handle.
    ///
    /// Assertions:
    /// - Ensures dropping a clone leaves the stored values alone.
    /// - Confirms dropping the last handle disposes every remaining value.
    /// - Confirms a `Cleared` event reports how many were removed.
    #[test]
    fn test_drop_disposes_remaining_values() {
        let disposed = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&disposed);
        let sink = Arc::new(RecordingSink::default());
        let cache: Cache<u32, u32> = Cache::builder(CacheOptions::fifo(4))
            .diagnostics_arc(sink.clone())
            .disposer(FnDisposer::new(move |_: u32| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .build()
            .unwrap();

        cache.put(1, 1).unwrap();
        cache.put(2, 2).unwrap();

        drop(cache.clone());
        assert_eq!(disposed.load(Ordering::SeqCst), 0);

        drop(cache);
        assert_eq!(disposed.load(Ordering::SeqCst), 2);
        assert!(matches!(sink.events.lock().last(), Some(CacheEvent::Cleared { removed: 2 })));
    }
}
