//! Per-item bookkeeping
//!
//! Every stored value carries an [`ItemMetadata`] recording when it was
//! created, last read and last written, how often it was read, and the
//! expiration rule governing it. Expiry is evaluated on demand against a
//! caller-supplied instant and never cached.

use std::time::{Duration, Instant};

use super::config::Expiration;

/// Timestamps, access count and expiration rule of a cached item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMetadata {
    created_at: Instant,
    last_accessed_at: Instant,
    last_updated_at: Instant,
    access_count: u64,
    expiration: Expiration,
    expires_at: Option<Instant>,
}

impl ItemMetadata {
    /// Metadata for an item created at `now`
    pub fn new(now: Instant, expiration: Expiration) -> Self {
        let mut metadata = Self {
            created_at: now,
            last_accessed_at: now,
            last_updated_at: now,
            access_count: 0,
            expiration,
            expires_at: None,
        };
        metadata.expires_at = metadata.absolute_deadline();
        metadata
    }

    /// When the item was first stored
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// When the item was last read
    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    /// When the item's value was last written
    pub fn last_updated_at(&self) -> Instant {
        self.last_updated_at
    }

    /// Number of reads since creation
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Expiration rule in force
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    /// Record a read at `now`
    pub fn register_access(&mut self, now: Instant) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    /// Record a write at `now`, optionally installing a new expiration rule
    ///
    /// An absolute deadline is recomputed from the update time whether or not
    /// the rule changed.
    pub fn register_update(&mut self, now: Instant, expiration: Option<Expiration>) {
        self.last_updated_at = now;
        if let Some(expiration) = expiration {
            self.expiration = expiration;
        }
        self.expires_at = self.absolute_deadline();
    }

    /// Whether the item is expired as of `now`
    ///
    /// A zero TTL is expired on any check.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expiration {
            Expiration::None => false,
            Expiration::Absolute(ttl) if ttl.is_zero() => true,
            Expiration::Sliding(ttl) if ttl.is_zero() => true,
            Expiration::Absolute(_) => self.expires_at.is_some_and(|deadline| now > deadline),
            Expiration::Sliding(ttl) => {
                now.saturating_duration_since(self.sliding_reference()) > ttl
            }
        }
    }

    /// Instant after which the item counts as expired, if it can expire
    pub fn expires_at(&self) -> Option<Instant> {
        match self.expiration {
            Expiration::None => None,
            Expiration::Absolute(_) => self.expires_at,
            Expiration::Sliding(ttl) => checked_deadline(self.sliding_reference(), ttl),
        }
    }

    fn sliding_reference(&self) -> Instant {
        self.last_accessed_at.max(self.last_updated_at)
    }

    fn absolute_deadline(&self) -> Option<Instant> {
        match self.expiration {
            Expiration::Absolute(ttl) => checked_deadline(self.last_updated_at, ttl),
            Expiration::None | Expiration::Sliding(_) => None,
        }
    }
}

// Saturates to "never" when the deadline overflows the clock's range.
fn checked_deadline(base: Instant, ttl: Duration) -> Option<Instant> {
    base.checked_add(ttl)
}

/// A stored value and its metadata
#[derive(Debug, Clone)]
pub(crate) struct CacheItem<V> {
    pub(crate) value: V,
    pub(crate) metadata: ItemMetadata,
}

impl<V> CacheItem<V> {
    pub(crate) fn new(value: V, now: Instant, expiration: Expiration) -> Self {
        Self { value, metadata: ItemMetadata::new(now, expiration) }
    }

    /// Swap in a new value, returning the one it replaced
    pub(crate) fn replace(&mut self, value: V, now: Instant, expiration: Option<Expiration>) -> V {
        self.metadata.register_update(now, expiration);
        std::mem::replace(&mut self.value, value)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::metadata.
    use super::*;

    /// Validates `ItemMetadata::new` behavior.
    ///
    /// Assertions:
    /// - Confirms all timestamps start at creation time.
    /// - Confirms `access_count` starts at zero.
    #[test]
    fn test_new_metadata() {
        let now = Instant::now();
        let metadata = ItemMetadata::new(now, Expiration::None);

        assert_eq!(metadata.created_at(), now);
        assert_eq!(metadata.last_accessed_at(), now);
        assert_eq!(metadata.last_updated_at(), now);
        assert_eq!(metadata.access_count(), 0);
        assert_eq!(metadata.expires_at(), None);
        assert!(!metadata.is_expired(now + Duration::from_secs(3600)));
    }

    /// Validates `ItemMetadata::register_access` behavior.
    ///
    /// Assertions:
    /// - Confirms the access count and last-accessed timestamp advance.
    /// - Ensures the update timestamp is untouched.
    #[test]
    fn test_register_access() {
        let start = Instant::now();
        let mut metadata = ItemMetadata::new(start, Expiration::None);
        let later = start + Duration::from_millis(10);

        metadata.register_access(later);
        metadata.register_access(later);

        assert_eq!(metadata.access_count(), 2);
        assert_eq!(metadata.last_accessed_at(), later);
        assert_eq!(metadata.last_updated_at(), start);
    }

    /// Validates the absolute expiration scenario.
    ///
    /// Assertions:
    /// - Ensures the item is live at its deadline and expired just after.
    /// - Ensures reads do not extend an absolute deadline.
    #[test]
    fn test_absolute_expiration() {
        let start = Instant::now();
        let ttl = Duration::from_millis(100);
        let mut metadata = ItemMetadata::new(start, Expiration::Absolute(ttl));

        metadata.register_access(start + Duration::from_millis(90));

        assert_eq!(metadata.expires_at(), Some(start + ttl));
        assert!(!metadata.is_expired(start + ttl));
        assert!(metadata.is_expired(start + ttl + Duration::from_millis(1)));
    }

    /// Validates the absolute deadline refresh on update scenario.
    ///
    /// Assertions:
    /// - Confirms `expires_at` moves to `last_updated_at + ttl`.
    #[test]
    fn test_update_recomputes_absolute_deadline() {
        let start = Instant::now();
        let ttl = Duration::from_millis(100);
        let mut metadata = ItemMetadata::new(start, Expiration::Absolute(ttl));

        let update = start + Duration::from_millis(80);
        metadata.register_update(update, None);

        assert_eq!(metadata.expires_at(), Some(update + ttl));
        assert!(!metadata.is_expired(start + Duration::from_millis(150)));
    }

    /// Validates the sliding expiration scenario.
    ///
    /// Assertions:
    /// - Ensures each read pushes the deadline forward.
    /// - Ensures the item expires once left untouched past its TTL.
    #[test]
    fn test_sliding_expiration() {
        let start = Instant::now();
        let ttl = Duration::from_millis(50);
        let mut metadata = ItemMetadata::new(start, Expiration::Sliding(ttl));

        let touch = start + Duration::from_millis(40);
        metadata.register_access(touch);

        assert!(!metadata.is_expired(start + Duration::from_millis(80)));
        assert_eq!(metadata.expires_at(), Some(touch + ttl));
        assert!(metadata.is_expired(touch + ttl + Duration::from_millis(1)));
    }

    /// Validates the sliding reference uses the later of access and update.
    ///
    /// Assertions:
    /// - Ensures a write also keeps a sliding item alive.
    #[test]
    fn test_sliding_reference_includes_updates() {
        let start = Instant::now();
        let ttl = Duration::from_millis(50);
        let mut metadata = ItemMetadata::new(start, Expiration::Sliding(ttl));

        let update = start + Duration::from_millis(45);
        metadata.register_update(update, None);

        assert!(!metadata.is_expired(start + Duration::from_millis(90)));
        assert_eq!(metadata.expires_at(), Some(update + ttl));
    }

    /// Validates the zero TTL scenario.
    ///
    /// Assertions:
    /// - Ensures a zero TTL is expired even at the creation instant.
    #[test]
    fn test_zero_ttl_is_always_expired() {
        let now = Instant::now();
        assert!(ItemMetadata::new(now, Expiration::Absolute(Duration::ZERO)).is_expired(now));
        assert!(ItemMetadata::new(now, Expiration::Sliding(Duration::ZERO)).is_expired(now));
    }

    /// Validates the expiration override on update scenario.
    ///
    /// Assertions:
    /// - Confirms the override replaces the previous rule.
    #[test]
    fn test_update_installs_new_expiration() {
        let start = Instant::now();
        let mut metadata = ItemMetadata::new(start, Expiration::None);

        metadata.register_update(start, Some(Expiration::Absolute(Duration::from_secs(1))));

        assert_eq!(metadata.expiration(), Expiration::Absolute(Duration::from_secs(1)));
        assert_eq!(metadata.expires_at(), Some(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_cache_item_replace_returns_old_value() {
        let start = Instant::now();
        let mut item = CacheItem::new("old", start, Expiration::None);

        let later = start + Duration::from_millis(5);
        let previous = item.replace("new", later, None);

        assert_eq!(previous, "old");
        assert_eq!(item.value, "new");
        assert_eq!(item.metadata.last_updated_at(), later);
    }
}
