//! Application busy state.
//!
//! The busy signal is a single shared counter tracking how many requests and
//! arrival executions are currently in flight. The gateway increments it at
//! request entry and decrements it at request exit; the worker brackets each
//! arrival execution with its own pair. Monitoring collaborators read it as
//! BUSY (counter above zero) or STANDBY (zero).
//!
//! Callers never touch the raw counter. [`BusySignal::enter`] returns a
//! [`BusyGuard`] whose drop performs the decrement, so the release runs on
//! every exit path including early returns and panics. Backing-store failures
//! are logged and swallowed: busy-signal unavailability must never fail a
//! user-facing request.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Observable application state derived from the busy counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// At least one request or arrival execution is in flight.
    Busy,
    /// Nothing is in flight.
    Standby,
}

impl AppState {
    /// Wire representation used by the state reporter and API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "BUSY",
            Self::Standby => "STANDBY",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error from the counter backing store.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The backing store could not be reached or rejected the operation.
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Narrow interface over the shared request counter.
///
/// The deployment decides the backing store; everything above this trait only
/// sees increment/decrement/read. Implementations must be safe under
/// concurrent mutation from every request and every in-flight task.
pub trait CounterStore: Send + Sync + 'static {
    /// Increments the counter, returning the new value.
    fn incr(&self) -> Result<i64, CounterError>;

    /// Decrements the counter, returning the new value.
    ///
    /// Must saturate at zero: the counter never goes negative.
    fn decr(&self) -> Result<i64, CounterError>;

    /// Reads the current value.
    fn get(&self) -> Result<i64, CounterError>;
}

/// In-process atomic counter store.
///
/// Lock-free and infallible. Suitable when the gateway and worker share one
/// process; a shared key-value store implements the same trait for
/// multi-process deployments.
#[derive(Debug, Default)]
pub struct AtomicCounterStore {
    value: AtomicI64,
}

impl AtomicCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for AtomicCounterStore {
    fn incr(&self) -> Result<i64, CounterError> {
        Ok(self.value.fetch_add(1, Ordering::AcqRel) + 1)
    }

    fn decr(&self) -> Result<i64, CounterError> {
        // Saturating decrement so unmatched releases cannot drive it negative.
        let prev = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some((v - 1).max(0))
            })
            .unwrap_or_else(|v| v);
        Ok((prev - 1).max(0))
    }

    fn get(&self) -> Result<i64, CounterError> {
        Ok(self.value.load(Ordering::Acquire))
    }
}

/// Shared busy signal over a [`CounterStore`].
///
/// Cloneable; all clones observe the same counter.
#[derive(Clone)]
pub struct BusySignal {
    store: Arc<dyn CounterStore>,
}

impl BusySignal {
    /// Creates a busy signal over the given store.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Creates a busy signal over an in-process atomic counter.
    pub fn in_process() -> Self {
        Self::new(Arc::new(AtomicCounterStore::new()))
    }

    /// Marks one unit of work as in flight.
    ///
    /// The returned guard decrements the counter when dropped. Store errors
    /// are logged and swallowed.
    pub fn enter(&self) -> BusyGuard {
        if let Err(err) = self.store.incr() {
            warn!(error = %err, "Could not increment busy counter");
        }
        BusyGuard {
            signal: self.clone(),
        }
    }

    /// Reads the current state.
    ///
    /// Reports STANDBY if the store is unreachable (logged).
    pub fn read(&self) -> AppState {
        match self.store.get() {
            Ok(v) if v > 0 => AppState::Busy,
            Ok(_) => AppState::Standby,
            Err(err) => {
                warn!(error = %err, "Could not read busy counter");
                AppState::Standby
            }
        }
    }

    /// Current raw counter value, for observability. Zero if unreachable.
    pub fn count(&self) -> i64 {
        match self.store.get() {
            Ok(v) => v,
            Err(err) => {
                warn!(error = %err, "Could not read busy counter");
                0
            }
        }
    }
}

impl std::fmt::Debug for BusySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusySignal")
            .field("count", &self.count())
            .finish()
    }
}

/// Guard for one in-flight unit of work.
///
/// Decrements the busy counter on drop. Store errors are logged and swallowed.
pub struct BusyGuard {
    signal: BusySignal,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Err(err) = self.signal.store.decr() {
            warn!(error = %err, "Could not decrement busy counter");
        }
    }
}

impl std::fmt::Debug for BusyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyGuard").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_as_str() {
        assert_eq!(AppState::Busy.as_str(), "BUSY");
        assert_eq!(AppState::Standby.as_str(), "STANDBY");
        assert_eq!(format!("{}", AppState::Busy), "BUSY");
    }

    #[test]
    fn test_starts_standby() {
        let busy = BusySignal::in_process();
        assert_eq!(busy.read(), AppState::Standby);
        assert_eq!(busy.count(), 0);
    }

    #[test]
    fn test_enter_and_release() {
        let busy = BusySignal::in_process();

        let guard = busy.enter();
        assert_eq!(busy.read(), AppState::Busy);
        assert_eq!(busy.count(), 1);

        drop(guard);
        assert_eq!(busy.read(), AppState::Standby);
        assert_eq!(busy.count(), 0);
    }

    #[test]
    fn test_counter_matches_unreleased_guards() {
        let busy = BusySignal::in_process();

        let g1 = busy.enter();
        let g2 = busy.enter();
        let g3 = busy.enter();
        assert_eq!(busy.count(), 3);

        drop(g2);
        assert_eq!(busy.count(), 2);
        drop(g1);
        drop(g3);
        assert_eq!(busy.count(), 0);
        assert_eq!(busy.read(), AppState::Standby);
    }

    #[test]
    fn test_clones_share_counter() {
        let busy = BusySignal::in_process();
        let other = busy.clone();

        let _guard = busy.enter();
        assert_eq!(other.read(), AppState::Busy);
    }

    #[test]
    fn test_decrement_saturates_at_zero() {
        let store = AtomicCounterStore::new();
        assert_eq!(store.decr().unwrap(), 0);
        assert_eq!(store.get().unwrap(), 0);

        store.incr().unwrap();
        store.decr().unwrap();
        store.decr().unwrap();
        assert_eq!(store.get().unwrap(), 0);
    }

    #[test]
    fn test_guard_released_on_early_exit() {
        let busy = BusySignal::in_process();

        fn bails_out(busy: &BusySignal) -> Result<(), &'static str> {
            let _guard = busy.enter();
            Err("boom")
        }

        assert!(bails_out(&busy).is_err());
        assert_eq!(busy.read(), AppState::Standby);
    }

    #[tokio::test]
    async fn test_concurrent_enters_no_lost_updates() {
        let busy = BusySignal::in_process();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let busy = busy.clone();
            handles.push(tokio::spawn(async move {
                let _guard = busy.enter();
                tokio::task::yield_now().await;
            }));
        }
        for handle in handles {
            handle.await.expect("task should not panic");
        }

        assert_eq!(busy.count(), 0);
        assert_eq!(busy.read(), AppState::Standby);
    }

    #[test]
    fn test_failing_store_is_swallowed() {
        struct BrokenStore;
        impl CounterStore for BrokenStore {
            fn incr(&self) -> Result<i64, CounterError> {
                Err(CounterError::Unavailable("down".into()))
            }
            fn decr(&self) -> Result<i64, CounterError> {
                Err(CounterError::Unavailable("down".into()))
            }
            fn get(&self) -> Result<i64, CounterError> {
                Err(CounterError::Unavailable("down".into()))
            }
        }

        let busy = BusySignal::new(Arc::new(BrokenStore));
        let guard = busy.enter();
        assert_eq!(busy.read(), AppState::Standby);
        assert_eq!(busy.count(), 0);
        drop(guard);
    }
}
