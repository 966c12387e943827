//! Diagnostic events emitted by the cache
//!
//! The cache never writes logs itself. It describes what happened as a
//! [`CacheEvent`] and hands it to an injected [`DiagnosticSink`]. The default
//! [`TracingSink`] forwards events to `tracing`; [`NullSink`] discards them.
//!
//! Keys are rendered with `Debug` before they reach the sink so sinks stay
//! independent of the cache's key type.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::config::{EvictionPolicy, Expiration};
use crate::error::DisposeError;

/// Structured description of something the cache did
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CacheEvent {
    /// A cache was constructed
    Initialized { capacity: usize, policy: EvictionPolicy, default_expiration: Expiration },

    /// A live entry was removed to make room
    Evicted { key: String, total_evictions: u64 },

    /// An expired entry was removed
    Purged { key: String },

    /// The cache was emptied
    Cleared { removed: usize },

    /// The policy nominated nothing although entries were present
    NoCandidate { key: String, count: usize },

    /// The policy nominated a key the store does not hold
    CandidateMissing { candidate: String },

    /// A removed value failed to clean up
    DisposalFailed { error: DisposeError },

    /// Background disposal stopped early on cancellation
    DisposalCancelled { skipped: usize },
}

impl CacheEvent {
    /// Returns `true` for events describing an internal inconsistency or failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::NoCandidate { .. } | Self::CandidateMissing { .. } | Self::DisposalFailed { .. }
        )
    }
}

/// Receiver for cache diagnostics
pub trait DiagnosticSink: Send + Sync {
    /// Handle one event. Called while the cache gate may still be held, so
    /// implementations should be quick and must not call back into the cache.
    fn record(&self, event: &CacheEvent);
}

/// Sink that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &CacheEvent) {
        match event {
            CacheEvent::Initialized { capacity, policy, default_expiration } => {
                info!(
                    capacity = *capacity,
                    policy = %policy,
                    default_ttl_ms = default_expiration.ttl().map(duration_ms),
                    "Cache initialized"
                );
            }
            CacheEvent::Evicted { key, total_evictions } => {
                debug!(key = %key, total_evictions = *total_evictions, "Evicted cache entry");
            }
            CacheEvent::Purged { key } => {
                debug!(key = %key, "Purged expired cache entry");
            }
            CacheEvent::Cleared { removed } => {
                info!(removed = *removed, "Cache cleared");
            }
            CacheEvent::NoCandidate { key, count } => {
                error!(
                    key = %key,
                    count = *count,
                    "Eviction selector returned no candidate for a non-empty cache"
                );
            }
            CacheEvent::CandidateMissing { candidate } => {
                error!(candidate = %candidate, "Eviction candidate not present in cache");
            }
            CacheEvent::DisposalFailed { error } => {
                error!(error = %error, "Failed to dispose cached value");
            }
            CacheEvent::DisposalCancelled { skipped } => {
                warn!(skipped = *skipped, "Background disposal cancelled");
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &CacheEvent) {}
}
