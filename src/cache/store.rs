//! Cache Store Module
//!
//! Lock-guarded map from keys to timestamped values. This is the single
//! owner of all entries; expiry is evaluated on every read and swept lazily.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::cache::stats::StatsCounters;
use crate::cache::{calc_expiration, CacheEntry, CacheStats, Ttl};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Thread-safe key/value storage with per-entry expiry.
///
/// Reads (`get`, `len`) take the shared lock; every write takes the
/// exclusive lock for its whole duration, including the existence check of
/// `add` and `replace`.
#[derive(Debug)]
pub(crate) struct Store<V> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// TTL used for `Ttl::Default` writes, zero = never expires
    default_ttl: Duration,
    /// Read and purge counters
    stats: StatsCounters,
}

impl<V> Store<V> {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            stats: StatsCounters::default(),
        }
    }

    /// Returns the TTL applied to `Ttl::Default` writes.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // A panicking writer cannot leave the map half-updated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry_for(&self, value: V, ttl: Ttl, now: Instant) -> CacheEntry<V> {
        CacheEntry::new(value, calc_expiration(self.default_ttl, ttl, now))
    }

    // == Set ==
    /// Inserts or overwrites `key` unconditionally.
    pub fn set(&self, key: String, value: V, ttl: Ttl) {
        let entry = self.entry_for(value, ttl, Instant::now());
        self.write().insert(key, entry);
    }

    // == Add ==
    /// Inserts only if no live entry exists for `key`.
    ///
    /// An expired entry counts as absent and is overwritten.
    pub fn add(&self, key: String, value: V, ttl: Ttl) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.write();

        if entries.get(&key).is_some_and(|e| !e.is_expired_at(now)) {
            return Err(CacheError::AlreadyExists(key));
        }

        let entry = self.entry_for(value, ttl, now);
        entries.insert(key, entry);
        Ok(())
    }

    // == Replace ==
    /// Overwrites `key` only if a live entry already exists.
    pub fn replace(&self, key: String, value: V, ttl: Ttl) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.write();

        if !entries.get(&key).is_some_and(|e| !e.is_expired_at(now)) {
            return Err(CacheError::NotFound(key));
        }

        let entry = self.entry_for(value, ttl, now);
        entries.insert(key, entry);
        Ok(())
    }

    // == Delete ==
    /// Removes `key`.
    ///
    /// Fails with `NotFound` if the key is absent or already expired. An
    /// expired entry is still removed, so storage is reclaimed either way.
    pub fn delete(&self, key: &str) -> Result<()> {
        let now = Instant::now();
        match self.write().remove(key) {
            Some(entry) if !entry.is_expired_at(now) => Ok(()),
            _ => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Clear ==
    /// Discards every entry.
    pub fn clear(&self) {
        self.write().clear();
    }

    // == Length ==
    /// Returns the number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    // == Is Empty ==
    /// Returns true if nothing is physically stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // == Delete Expired ==
    /// Removes every entry whose expiry is set and has passed.
    ///
    /// Expiry is judged against a single instant taken at the start of the
    /// scan. Returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        drop(entries);
        self.stats.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }
}

impl<V: Clone> Store<V> {
    // == Get ==
    /// Returns a clone of the value if a live entry exists.
    ///
    /// Expired entries are reported as absent but left in place for the
    /// sweeper.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let value = self
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone());

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Time To Live ==
    /// Returns the remaining TTL of a live entry.
    ///
    /// `Some(None)` means the entry never expires; `None` means there is no
    /// live entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        self.read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(CacheEntry::ttl_remaining)
    }
}
