//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::cache::Store;
use crate::error::{CacheError, Result};

// == Sweeper State ==
/// Lifecycle of a sweeper. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    /// Constructed, no task spawned yet
    Idle,
    /// Task spawned and ticking
    Running,
    /// Stop signal sent; no further purges will be started
    Stopped,
}

enum Lifecycle {
    Idle,
    Running {
        shutdown_tx: watch::Sender<bool>,
        task: JoinHandle<()>,
    },
    Stopped,
}

impl Lifecycle {
    fn state(&self) -> SweeperState {
        match self {
            Lifecycle::Idle => SweeperState::Idle,
            Lifecycle::Running { .. } => SweeperState::Running,
            Lifecycle::Stopped => SweeperState::Stopped,
        }
    }
}

// == Sweeper ==
/// Periodically calls [`Store::delete_expired`] on one store.
///
/// The spawned task holds the store, never the cache handle, so the handle
/// can be dropped (and stop the sweeper) while a pass is in flight.
pub(crate) struct Sweeper {
    interval: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl Sweeper {
    /// Creates an idle sweeper with the given period.
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Returns the current lifecycle state.
    pub(crate) fn state(&self) -> SweeperState {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Spawns the purge loop on the current Tokio runtime.
    ///
    /// Only an `Idle` sweeper can be started; a stopped sweeper is never
    /// restarted. Fails with `SweeperDisabled` for a zero interval and with
    /// `NoRuntime` when called outside a runtime; the state stays `Idle`.
    pub(crate) fn start<V>(&self, store: Arc<Store<V>>) -> Result<()>
    where
        V: Send + Sync + 'static,
    {
        let mut lifecycle = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !matches!(*lifecycle, Lifecycle::Idle) {
            return Err(CacheError::SweeperNotIdle(lifecycle.state()));
        }

        if self.interval.is_zero() {
            return Err(CacheError::SweeperDisabled);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = runtime.spawn(sweep_loop(store, self.interval, shutdown_rx));

        *lifecycle = Lifecycle::Running { shutdown_tx, task };
        Ok(())
    }

    /// Sends the stop signal without waiting for the task to exit.
    ///
    /// A pass already in progress may still complete. Returns true if a
    /// running task was signalled. Idempotent.
    pub(crate) fn stop(&self) -> bool {
        let mut lifecycle = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running { shutdown_tx, task } => {
                // Fails only if the loop already exited and dropped its receiver.
                if shutdown_tx.send(true).is_err() {
                    trace!("Expiry sweeper already exited before stop");
                }
                // Detach; the loop exits on its own once it sees the signal.
                drop(task);
                debug!("Expiry sweeper stop requested");
                true
            }
            Lifecycle::Idle | Lifecycle::Stopped => false,
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish()
    }
}

/// Purge loop: waits for the next tick or the stop signal, whichever comes first.
async fn sweep_loop<V>(
    store: Arc<Store<V>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        "Starting expiry sweeper with interval of {} ms",
        interval.as_millis()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; the first pass waits a full interval.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = store.delete_expired();

                if removed > 0 {
                    info!("Expiry sweep: removed {} expired entries", removed);
                } else {
                    debug!("Expiry sweep: no expired entries found");
                }
            }
            changed = shutdown_rx.changed() => {
                // A dropped sender means the owner is gone as well.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    debug!("Expiry sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Ttl;

    fn store_with(entries: &[(&str, Ttl)]) -> Arc<Store<&'static str>> {
        let store = Arc::new(Store::new(Duration::ZERO));
        for (key, ttl) in entries {
            store.set(key.to_string(), "value", *ttl);
        }
        store
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let store = store_with(&[("expire_soon", Ttl::millis(50))]);

        let sweeper = Sweeper::new(Duration::from_millis(100));
        sweeper.start(Arc::clone(&store)).unwrap();
        assert_eq!(sweeper.state(), SweeperState::Running);

        tokio::time::sleep(Duration::from_millis(350)).await;

        // No get in between: only the sweep can have shrunk the map
        assert_eq!(store.len(), 0, "Expired entry should have been swept");
        assert_eq!(store.stats().expired_removed, 1);

        sweeper.stop();
    }

    #[tokio::test]
    async fn test_sweeper_preserves_live_entries() {
        let store = store_with(&[("long_lived", Ttl::secs(3600)), ("forever", Ttl::Never)]);

        let sweeper = Sweeper::new(Duration::from_millis(50));
        sweeper.start(Arc::clone(&store)).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("long_lived"), Some("value"));

        sweeper.stop();
    }

    #[tokio::test]
    async fn test_sweeper_stop_is_terminal() {
        let store = store_with(&[]);
        let sweeper = Sweeper::new(Duration::from_millis(50));
        assert_eq!(sweeper.state(), SweeperState::Idle);

        sweeper.start(Arc::clone(&store)).unwrap();
        assert!(sweeper.stop());
        assert!(!sweeper.stop(), "Second stop should be a no-op");
        assert_eq!(sweeper.state(), SweeperState::Stopped);

        let restart = sweeper.start(store);
        assert_eq!(restart, Err(CacheError::SweeperNotIdle(SweeperState::Stopped)));
    }

    #[tokio::test]
    async fn test_sweeper_cannot_start_twice() {
        let store = store_with(&[]);
        let sweeper = Sweeper::new(Duration::from_millis(50));

        sweeper.start(Arc::clone(&store)).unwrap();
        let again = sweeper.start(store);
        assert_eq!(again, Err(CacheError::SweeperNotIdle(SweeperState::Running)));
    }

    #[tokio::test]
    async fn test_stopped_sweeper_releases_store() {
        let store = store_with(&[("expire_soon", Ttl::millis(20))]);
        let sweeper = Sweeper::new(Duration::from_millis(50));

        sweeper.start(Arc::clone(&store)).unwrap();
        assert_eq!(Arc::strong_count(&store), 2);

        sweeper.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(Arc::strong_count(&store), 1, "Task should have dropped its store");
        assert_eq!(store.len(), 1, "No purge after stop");
    }

    #[tokio::test]
    async fn test_sweeper_zero_interval_never_starts() {
        let store = store_with(&[]);
        let sweeper = Sweeper::new(Duration::ZERO);

        assert_eq!(sweeper.start(Arc::clone(&store)), Err(CacheError::SweeperDisabled));
        assert_eq!(sweeper.state(), SweeperState::Idle);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(Arc::strong_count(&store), 1, "No task should hold the store");
        assert!(!sweeper.stop(), "Nothing running to signal");
    }

    #[test]
    fn test_sweeper_requires_runtime() {
        let store = store_with(&[]);
        let sweeper = Sweeper::new(Duration::from_millis(50));

        assert_eq!(sweeper.start(store), Err(CacheError::NoRuntime));
        assert_eq!(sweeper.state(), SweeperState::Idle);
    }
}
