//! TTL Cache - A thread-safe in-process key/value store
//!
//! Every entry carries an optional time-to-live. Expired entries are hidden
//! from reads immediately and physically purged by a background sweeper that
//! stops when the last handle to the cache is dropped.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::SweeperState;
