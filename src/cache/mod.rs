//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL, lazy expiry on read, and
//! a handle that owns the background sweeper.

mod entry;
mod handle;
mod stats;
mod store;
mod ttl;


// Re-export public types; the store is only reachable through `Cache`
pub use handle::Cache;
pub use stats::CacheStats;
pub use ttl::Ttl;

pub(crate) use entry::CacheEntry;
pub(crate) use store::Store;
pub(crate) use ttl::calc_expiration;
