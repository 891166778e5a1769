//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::tasks::SweeperState;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A live entry already occupies the key
    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    /// No live entry exists for the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A sweeper was requested outside of a Tokio runtime
    #[error("Background sweeper requires a Tokio runtime")]
    NoRuntime,

    /// A zero cleanup interval means no sweeper may run
    #[error("Sweeper is disabled by a zero cleanup interval")]
    SweeperDisabled,

    /// The sweeper can only be started once
    #[error("Sweeper cannot be started from state {0:?}")]
    SweeperNotIdle(SweeperState),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
