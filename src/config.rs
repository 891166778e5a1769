//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// A zero `default_ttl` means entries written with [`crate::Ttl::Default`]
/// never expire. A zero `cleanup_interval` disables the background sweeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied when a caller asks for the default
    pub default_ttl: Duration,
    /// Period between background purge passes
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep period in milliseconds (default: 1000)
    ///
    /// Values are signed; anything `<= 0` maps to zero.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: millis_from_env("CACHE_DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl),
            cleanup_interval: millis_from_env("CACHE_CLEANUP_INTERVAL_MS")
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Sets the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the cleanup interval
    ///
    /// This determines how often the background task removes expired entries.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Returns true if a background sweeper should be spawned.
    pub fn sweeper_enabled(&self) -> bool {
        !self.cleanup_interval.is_zero()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(1),
        }
    }
}

/// Parses a signed millisecond count, clamping negatives to zero.
fn millis_from_env(name: &str) -> Option<Duration> {
    let millis: i64 = env::var(name).ok()?.trim().parse().ok()?;
    Some(
        chrono::Duration::milliseconds(millis)
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}
