//! Error types for cache operations
//!
//! The taxonomy is deliberately small:
//!
//! | Variant | When | Retryable |
//! |---------|------|-----------|
//! | `NotFound` | `get`/`metadata` on an absent or lazily-expired key | no |
//! | `CacheFull` | capacity enforcement could not free a slot | yes |
//! | `InvalidConfiguration` | construction-time validation failed | no |
//! | `Cancelled` | an async caller cancelled before entering the gate | no |
//!
//! Disposal failures use the separate [`DisposeError`]; they are reported to
//! the diagnostic sink and never abort the operation that removed the value.
//!
//! ## ErrorClassification Trait
//!
//! [`CacheError`] implements [`ErrorClassification`] so callers can decide
//! whether to retry, drop, or resize without matching on every variant:
//!
//! ```
//! use evicache::{Cache, CacheOptions, ErrorClassification};
//!
//! let cache: Cache<u32, u32> = Cache::new(CacheOptions::no_eviction(1)).unwrap();
//! cache.put(1, 1).unwrap();
//!
//! let err = cache.put(2, 2).unwrap_err();
//! assert!(err.is_retryable());
//! ```

use std::fmt;

use thiserror::Error;

use crate::cache::EvictionPolicy;

/// Standard result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Why capacity enforcement gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFullReason {
    /// The policy never nominates a candidate (hard ceiling)
    PolicyNeverEvicts,
    /// The policy returned no candidate for a non-empty cache
    NoCandidate,
    /// Every bounded attempt failed to free a slot
    AttemptsExhausted,
}

impl fmt::Display for CacheFullReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyNeverEvicts => write!(f, "policy never evicts"),
            Self::NoCandidate => write!(f, "selector returned no candidate"),
            Self::AttemptsExhausted => write!(f, "eviction attempts exhausted"),
        }
    }
}

/// Cache operation errors
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The key is absent, or was present but expired and has been purged
    #[error("Key not found in cache: {key}")]
    NotFound { key: String },

    /// No slot could be freed for a new key
    #[error("Cache is full (capacity: {capacity}, policy: {policy}) while adding key {key}: {reason}")]
    CacheFull { capacity: usize, key: String, policy: EvictionPolicy, reason: CacheFullReason },

    /// Options rejected at construction time
    #[error("Invalid cache configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    /// An async caller cancelled while waiting for the gate
    #[error("Cache operation '{operation}' was cancelled")]
    Cancelled { operation: String },
}

impl CacheError {
    /// Create a `NotFound` error for a key
    pub fn not_found(key: &impl fmt::Debug) -> Self {
        Self::NotFound { key: format!("{key:?}") }
    }

    /// Create an `InvalidConfiguration` error
    pub fn invalid_configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration { field: field.into(), message: message.into() }
    }

    /// Create a `Cancelled` error for the named operation
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled { operation: operation.into() }
    }

    /// Returns `true` for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for `CacheFull`
    pub fn is_cache_full(&self) -> bool {
        matches!(self, Self::CacheFull { .. })
    }
}

/// Error raised while cleaning up a single removed value
#[derive(Debug, Clone, Error)]
#[error("Failed to dispose cached value: {message}")]
pub struct DisposeError {
    message: String,
}

impl DisposeError {
    /// Create a new disposal error
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The failure message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: the same call may succeed later
    /// without any change on the caller's side.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl ErrorClassification for CacheError {
    fn is_retryable(&self) -> bool {
        // Space may free up once other entries expire or are removed
        matches!(self, Self::CacheFull { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } | Self::Cancelled { .. } => ErrorSeverity::Info,
            Self::CacheFull { .. } => ErrorSeverity::Warning,
            Self::InvalidConfiguration { .. } => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }
}

impl ErrorClassification for DisposeError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    fn is_critical(&self) -> bool {
        false
    }
}
