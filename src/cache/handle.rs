//! Cache Handle Module
//!
//! The caller-facing handle. Dropping the last clone stops the background
//! sweeper, after which the store itself is released.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheStats, Store, Ttl};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{Sweeper, SweeperState};

struct CacheInner<V> {
    store: Arc<Store<V>>,
    sweeper: Option<Sweeper>,
}

impl<V> Drop for CacheInner<V> {
    fn drop(&mut self) {
        if let Some(sweeper) = &self.sweeper {
            if sweeper.stop() {
                debug!("Last cache handle dropped, expiry sweeper signalled");
            }
        }
    }
}

// == Cache ==
/// Thread-safe key/value cache with per-entry TTL.
///
/// Cloning is cheap and every clone shares the same entries. When a cleanup
/// interval is configured, a background sweeper purges expired entries until
/// [`Cache::close`] is called or the last clone is dropped.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ttl_cache::{Cache, Ttl};
///
/// // No default TTL, no sweeper: expiry is purely lazy
/// let cache = Cache::new(Duration::ZERO, Duration::ZERO).unwrap();
///
/// cache.set("session", 42, Ttl::secs(30));
/// assert_eq!(cache.get("session"), Some(42));
/// assert!(cache.add("session", 7, Ttl::Default).is_err());
/// ```
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the given default TTL and cleanup interval.
    ///
    /// A zero `default_ttl` means default writes never expire. A zero
    /// `cleanup_interval` disables the sweeper; otherwise this must be called
    /// from within a Tokio runtime or it fails with `NoRuntime`.
    pub fn new(default_ttl: Duration, cleanup_interval: Duration) -> Result<Self> {
        Self::with_config(
            CacheConfig::new()
                .with_default_ttl(default_ttl)
                .with_cleanup_interval(cleanup_interval),
        )
    }

    /// Creates a cache from a [`CacheConfig`].
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let store = Arc::new(Store::new(config.default_ttl));

        let sweeper = if config.sweeper_enabled() {
            let sweeper = Sweeper::new(config.cleanup_interval);
            sweeper.start(Arc::clone(&store))?;
            Some(sweeper)
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(CacheInner { store, sweeper }),
        })
    }
}

impl<V> Cache<V> {
    fn store(&self) -> &Store<V> {
        &self.inner.store
    }

    /// Inserts or overwrites `key`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: impl Into<Ttl>) {
        self.store().set(key.into(), value, ttl.into());
    }

    /// Inserts only if no live entry exists, failing with `AlreadyExists`.
    pub fn add(&self, key: impl Into<String>, value: V, ttl: impl Into<Ttl>) -> Result<()> {
        self.store().add(key.into(), value, ttl.into())
    }

    /// Overwrites only if a live entry exists, failing with `NotFound`.
    pub fn replace(&self, key: impl Into<String>, value: V, ttl: impl Into<Ttl>) -> Result<()> {
        self.store().replace(key.into(), value, ttl.into())
    }

    /// Removes a live entry, failing with `NotFound` if absent or expired.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.store().delete(key)
    }

    pub fn clear(&self) {
        self.store().clear();
    }

    /// Physically stored entries, including expired ones not yet swept.
    pub fn item_count(&self) -> usize {
        self.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    /// Runs one purge pass now; returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        self.store().delete_expired()
    }

    pub fn default_ttl(&self) -> Duration {
        self.store().default_ttl()
    }

    pub fn stats(&self) -> CacheStats {
        self.store().stats()
    }

    /// Returns the sweeper state, or `None` if the sweeper is disabled.
    pub fn sweeper_state(&self) -> Option<SweeperState> {
        self.inner.sweeper.as_ref().map(Sweeper::state)
    }

    /// Stops the background sweeper for every clone of this cache.
    ///
    /// The cache stays usable with lazy expiry only. Idempotent.
    pub fn close(&self) {
        if let Some(sweeper) = &self.inner.sweeper {
            sweeper.stop();
        }
    }
}

impl<V: Clone> Cache<V> {
    /// Returns a clone of the value for a live entry.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store().get(key)
    }

    /// Remaining TTL of a live entry; `Some(None)` if it never expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        self.store().ttl_remaining(key)
    }
}

impl<V> std::fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("default_ttl", &self.default_ttl())
            .field("item_count", &self.item_count())
            .field("sweeper", &self.inner.sweeper)
            .finish()
    }
}
