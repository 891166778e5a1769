//! TTL Resolution Module
//!
//! Turns a per-call TTL request and the cache-wide default into an absolute
//! expiry instant.

use std::time::{Duration, Instant};

// == Ttl ==
/// Time-to-live requested for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's default TTL (which may itself mean "never expires")
    #[default]
    Default,
    /// Never expire, regardless of the cache's default
    Never,
    /// Expire after the given duration. A zero duration behaves like `Default`.
    After(Duration),
}

impl Ttl {
    /// Shorthand for `Ttl::After(Duration::from_millis(ms))`.
    pub fn millis(ms: u64) -> Self {
        Ttl::from(Duration::from_millis(ms))
    }

    /// Shorthand for `Ttl::After(Duration::from_secs(secs))`.
    pub fn secs(secs: u64) -> Self {
        Ttl::from(Duration::from_secs(secs))
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::Default
        } else {
            Ttl::After(ttl)
        }
    }
}

/// Signed durations follow the sentinel convention: negative never expires,
/// zero uses the default, positive expires after that long.
impl From<chrono::Duration> for Ttl {
    fn from(ttl: chrono::Duration) -> Self {
        match ttl.to_std() {
            Ok(ttl) => Ttl::from(ttl),
            Err(_) => Ttl::Never,
        }
    }
}

// == Calculate Expiration ==
/// Resolves the absolute expiry for a write made at `now`.
///
/// 1. A positive requested TTL wins: `now + requested`.
/// 2. Otherwise a default request with a positive default gives `now + default`.
/// 3. Anything else never expires (`None`).
///
/// An instant that would overflow is treated as never expiring.
pub(crate) fn calc_expiration(default_ttl: Duration, requested: Ttl, now: Instant) -> Option<Instant> {
    match requested {
        Ttl::After(ttl) if !ttl.is_zero() => now.checked_add(ttl),
        Ttl::Default | Ttl::After(_) if !default_ttl.is_zero() => now.checked_add(default_ttl),
        _ => None,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const MS_50: Duration = Duration::from_millis(50);
    const MS_500: Duration = Duration::from_millis(500);

    #[test]
    fn test_positive_request_overrides_default() {
        let now = Instant::now();
        assert_eq!(calc_expiration(MS_500, Ttl::After(MS_50), now), Some(now + MS_50));
        assert_eq!(calc_expiration(Duration::ZERO, Ttl::After(MS_50), now), Some(now + MS_50));
    }

    #[test]
    fn test_default_request_uses_default_ttl() {
        let now = Instant::now();
        assert_eq!(calc_expiration(MS_500, Ttl::Default, now), Some(now + MS_500));
        assert_eq!(calc_expiration(MS_500, Ttl::After(Duration::ZERO), now), Some(now + MS_500));
    }

    #[test]
    fn test_never_overrides_default() {
        let now = Instant::now();
        assert_eq!(calc_expiration(MS_500, Ttl::Never, now), None);
    }

    #[test]
    fn test_all_zero_never_expires() {
        let now = Instant::now();
        assert_eq!(calc_expiration(Duration::ZERO, Ttl::Default, now), None);
        assert_eq!(calc_expiration(Duration::ZERO, Ttl::After(Duration::ZERO), now), None);
    }

    #[test]
    fn test_overflow_never_expires() {
        let now = Instant::now();
        assert_eq!(calc_expiration(Duration::ZERO, Ttl::After(Duration::MAX), now), None);
    }

    #[test]
    fn test_from_std_duration() {
        assert_eq!(Ttl::from(Duration::ZERO), Ttl::Default);
        assert_eq!(Ttl::from(MS_50), Ttl::After(MS_50));
        assert_eq!(Ttl::millis(50), Ttl::After(MS_50));
        assert_eq!(Ttl::secs(0), Ttl::Default);
    }

    #[test]
    fn test_from_signed_duration() {
        assert_eq!(Ttl::from(chrono::Duration::milliseconds(-1)), Ttl::Never);
        assert_eq!(Ttl::from(chrono::Duration::zero()), Ttl::Default);
        assert_eq!(Ttl::from(chrono::Duration::milliseconds(50)), Ttl::After(MS_50));
    }
}
