//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - Expiry Sweeper: Removes expired cache entries at the configured interval

mod sweeper;

pub(crate) use sweeper::Sweeper;
pub use sweeper::SweeperState;
