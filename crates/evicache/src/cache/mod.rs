//! Capacity-bounded cache with pluggable eviction and lazy expiration
//!
//! # Features
//!
//! - **One critical section**: blocking and async callers share one gate
//! - **Generic**: works with any `K: Eq + Hash + Clone + Debug` and `V: Clone`
//! - **Configurable eviction**: LRU, LFU, FIFO, or a hard ceiling
//! - **Expiration**: absolute or sliding TTL, per cache or per item
//! - **Disposal**: removed values pass through a pluggable [`Disposer`]
//! - **Testable**: clock abstraction for deterministic time-based testing
//!
//! # Examples
//!
//! ## Simple LRU Cache
//! ```
//! use evicache::{Cache, CacheOptions};
//!
//! let cache: Cache<String, i32> = Cache::new(CacheOptions::lru(100)).unwrap();
//! cache.put("key".to_string(), 42).unwrap();
//! assert_eq!(cache.try_get(&"key".to_string()), Some(42));
//! ```
//!
//! ## Sliding Expiration
//! ```
//! use std::time::Duration;
//!
//! use evicache::{Cache, CacheOptions, MockClock};
//!
//! let clock = MockClock::new();
//! let options = CacheOptions::builder()
//!     .capacity(10)
//!     .sliding_ttl(Duration::from_secs(60))
//!     .build();
//! let cache: Cache<&str, u32, MockClock> = Cache::with_clock(options, clock.clone()).unwrap();
//!
//! cache.put("session", 1).unwrap();
//! clock.advance(Duration::from_secs(61));
//! assert!(cache.try_get(&"session").is_none());
//! assert_eq!(cache.evictions(), 0);
//! ```
//!
//! ## Cache Statistics
//! ```
//! use evicache::{Cache, CacheOptions};
//!
//! let cache: Cache<String, i32> = Cache::new(CacheOptions::lfu(100)).unwrap();
//!
//! cache.put("key1".to_string(), 1).unwrap();
//! let _ = cache.try_get(&"key1".to_string());
//!
//! let stats = cache.stats();
//! println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
//! println!("Cache size: {}/{}", stats.size, stats.capacity);
//! ```
//!
//! # Thread Safety
//!
//! A `Cache` is a cheap handle over shared state; clone it into threads:
//!
//! ```
//! use std::thread;
//!
//! use evicache::{Cache, CacheOptions};
//!
//! let cache: Cache<String, usize> = Cache::new(CacheOptions::lru(100)).unwrap();
//!
//! let handles: Vec<_> = (0..10)
//!     .map(|i| {
//!         let cache = cache.clone();
//!         thread::spawn(move || cache.put(format!("key-{i}"), i).unwrap())
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.count(), 10);
//! ```

mod async_core;
mod config;
mod core;
mod diagnostics;
mod disposal;
mod gate;
mod inspect;
mod metadata;
mod stats;

// Re-export public API
pub use self::core::{Cache, CacheBuilder};

pub use config::{CacheOptions, CacheOptionsBuilder, EvictionPolicy, Expiration, ItemOptions};
pub use diagnostics::{CacheEvent, DiagnosticSink, NullSink, TracingSink};
pub use disposal::{
    Disposable, DisposableDisposer, DisposalHandle, Disposer, DropDisposer, FnDisposer,
};
pub use metadata::ItemMetadata;
pub use stats::CacheStats;
