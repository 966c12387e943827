//! Capacity-bounded in-process key/value cache.
//!
//! `evicache` stores values under keys up to a fixed capacity and, when the
//! cache is full, frees a slot according to a pluggable eviction policy
//! (LRU, LFU, FIFO, or a hard ceiling that never evicts). Items may carry an
//! absolute or sliding time-to-live; expired items are purged lazily the next
//! time they are looked up or nominated for eviction.
//!
//! # Safety and Quality
//!
//! All cache state lives behind a single exclusive gate shared by blocking
//! and async callers, so there is exactly one critical section to reason
//! about. Hit/miss/eviction counters are atomics read without the gate.
//!
//! # Feature Flags
//!
//! - `serde` (default): serializable [`CacheOptions`] and TOML loading.
//!
//! # Example
//!
//! ```
//! use evicache::{Cache, CacheOptions};
//!
//! # fn main() -> evicache::CacheResult<()> {
//! let cache: Cache<String, i32> = Cache::new(CacheOptions::lru(2))?;
//! cache.put("a".to_string(), 1)?;
//! cache.put("b".to_string(), 2)?;
//! assert_eq!(cache.get(&"a".to_string())?, 1);
//!
//! cache.put("c".to_string(), 3)?; // evicts "b"
//! assert!(cache.try_get(&"b".to_string()).is_none());
//! assert_eq!(cache.evictions(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod clock;
pub mod collections;
pub mod error;
pub mod policy;
#[cfg(feature = "serde")]
pub mod utils;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use cache::{
    Cache, CacheBuilder, CacheEvent, CacheOptions, CacheOptionsBuilder, CacheStats,
    DiagnosticSink, Disposable, DisposableDisposer, DisposalHandle, Disposer, DropDisposer,
    EvictionPolicy, Expiration, FnDisposer, ItemMetadata, ItemOptions, NullSink, TracingSink,
};
pub use clock::{Clock, MockClock, SystemClock};
pub use error::{
    CacheError, CacheFullReason, CacheResult, DisposeError, ErrorClassification, ErrorSeverity,
};
pub use policy::{EvictionHandler, PolicyHandler};
#[cfg(feature = "serde")]
pub use utils::serde::duration_millis;
