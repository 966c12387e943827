//! Cache configuration types and builder patterns
//!
//! This module provides the immutable options a cache is constructed from:
//! capacity, eviction policy, and the default expiration rule applied to
//! items that don't carry their own.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Eviction policy used when a full cache must make room for a new key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EvictionPolicy {
    /// Least Recently Used - evicts the least recently accessed entry
    #[default]
    Lru,
    /// Least Frequently Used - evicts the least frequently accessed entry
    Lfu,
    /// First In First Out - evicts the oldest entry by insertion time
    Fifo,
    /// No eviction - a full cache rejects new keys
    NoEviction,
}

impl EvictionPolicy {
    /// Stable lowercase name of the policy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
            Self::Fifo => "fifo",
            Self::NoEviction => "no_eviction",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            "fifo" => Ok(Self::Fifo),
            "no_eviction" | "noeviction" | "none" => Ok(Self::NoEviction),
            other => Err(CacheError::invalid_configuration(
                "eviction_policy",
                format!("unrecognized eviction policy '{other}'"),
            )),
        }
    }
}

/// Expiration rule attached to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", content = "ttl_ms", rename_all = "snake_case"))]
pub enum Expiration {
    /// Never expires
    #[default]
    None,
    /// Expires a fixed time after creation or last update
    Absolute(#[cfg_attr(feature = "serde", serde(with = "crate::utils::serde::duration_millis"))] Duration),
    /// Expires a fixed time after last use
    Sliding(#[cfg_attr(feature = "serde", serde(with = "crate::utils::serde::duration_millis"))] Duration),
}

impl Expiration {
    /// The configured time-to-live, if any
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Absolute(ttl) | Self::Sliding(ttl) => Some(*ttl),
        }
    }

    /// Returns `true` when items never expire under this rule
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Per-item settings passed at write time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemOptions {
    /// Overrides the cache-wide default expiration for this item only
    pub expiration: Option<Expiration>,
}

impl ItemOptions {
    /// Options carrying an expiration override
    pub fn expiring(expiration: Expiration) -> Self {
        Self { expiration: Some(expiration) }
    }

    /// Absolute TTL override
    pub fn absolute(ttl: Duration) -> Self {
        Self::expiring(Expiration::Absolute(ttl))
    }

    /// Sliding TTL override
    pub fn sliding(ttl: Duration) -> Self {
        Self::expiring(Expiration::Sliding(ttl))
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheOptions {
    /// Maximum number of entries (must be positive)
    pub capacity: usize,

    /// Eviction policy when capacity is reached
    #[cfg_attr(feature = "serde", serde(default))]
    pub eviction_policy: EvictionPolicy,

    /// Expiration applied to items written without an override
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_expiration: Expiration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { capacity: 1024, eviction_policy: EvictionPolicy::Lru, default_expiration: Expiration::None }
    }
}

impl CacheOptions {
    /// Create a new configuration builder
    pub fn builder() -> CacheOptionsBuilder {
        CacheOptionsBuilder::default()
    }

    /// Quick preset for LRU cache
    ///
    /// # Example
    /// ```
    /// use evicache::CacheOptions;
    ///
    /// let options = CacheOptions::lru(1000);
    /// assert_eq!(options.capacity, 1000);
    /// ```
    pub fn lru(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::Lru)
    }

    /// Quick preset for LFU cache
    pub fn lfu(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::Lfu)
    }

    /// Quick preset for FIFO cache
    pub fn fifo(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::Fifo)
    }

    /// Quick preset for a cache with a hard capacity ceiling
    pub fn no_eviction(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::NoEviction)
    }

    fn with_policy(capacity: usize, eviction_policy: EvictionPolicy) -> Self {
        Self { capacity, eviction_policy, default_expiration: Expiration::None }
    }

    /// Check the options before any cache state is created
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when `capacity` is zero.
    pub fn validate(&self) -> CacheResult<()> {
        if self.capacity == 0 {
            return Err(CacheError::invalid_configuration(
                "capacity",
                "capacity must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse and validate options from a TOML document
    ///
    /// # Example
    /// ```
    /// use evicache::{CacheOptions, EvictionPolicy, Expiration};
    ///
    /// let options = CacheOptions::from_toml_str(
    ///     r#"
    ///     capacity = 500
    ///     eviction_policy = "lfu"
    ///     default_expiration = { mode = "sliding", ttl_ms = 30000 }
    ///     "#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(options.eviction_policy, EvictionPolicy::Lfu);
    /// assert_eq!(options.default_expiration, Expiration::Sliding(std::time::Duration::from_secs(30)));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when the document does not parse or the
    /// parsed options fail [`validate`](Self::validate).
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> CacheResult<Self> {
        let options: Self = toml::from_str(source)
            .map_err(|e| CacheError::invalid_configuration("toml", e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

/// Builder for CacheOptions with fluent API
#[derive(Debug, Default)]
pub struct CacheOptionsBuilder {
    options: CacheOptions,
}

impl CacheOptionsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of entries
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.options.capacity = capacity;
        self
    }

    /// Set eviction policy
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.options.eviction_policy = policy;
        self
    }

    /// Set the default expiration rule
    pub fn default_expiration(mut self, expiration: Expiration) -> Self {
        self.options.default_expiration = expiration;
        self
    }

    /// Default to an absolute TTL
    pub fn absolute_ttl(self, ttl: Duration) -> Self {
        self.default_expiration(Expiration::Absolute(ttl))
    }

    /// Default to a sliding TTL
    pub fn sliding_ttl(self, ttl: Duration) -> Self {
        self.default_expiration(Expiration::Sliding(ttl))
    }

    /// Build the configuration
    pub fn build(self) -> CacheOptions {
        self.options
    }
}
