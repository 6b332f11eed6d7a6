//! # Synchronization Core
//!
//! The [`Monitor`] is the one place shared mutable state lives. A single
//! mutex guards the product store, the gate flags and the activity counters,
//! so every admission predicate is evaluated atomically against all of them.
//!
//! ## Wake Signals
//!
//! Three [`Notify`] broadcasts stand in for condition variables:
//!
//! - **store changed**: fired after every successful mutation.
//! - **visitors opened** / **returns opened**: fired when a [`Gate`] opens.
//!
//! Waiters register on the signals they care about *before* evaluating their
//! predicate, so a broadcast landing between the check and the `.await` is
//! never lost. The lock is never held across an `.await`.
//!
//! ## Admission
//!
//! Actor bodies express their protocol as an `attempt` closure handed to
//! [`Monitor::admit`] (blocking) or [`Monitor::try_admit`] (probe). The
//! closure runs under the lock; it returns `None` when its predicate does not
//! hold and `Some(outcome)` after performing its mutation.

pub mod activity;
pub mod gate;
pub mod state;

pub use activity::{ActivityGuard, Role};
pub use gate::Gate;
pub use state::{FactoryState, FactoryStats};

use crate::config::FactoryConfig;
use crate::error::FactoryError;
use crate::model::Item;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, trace, warn};

pub struct Monitor<P: Item> {
    state: Mutex<FactoryState<P>>,
    store_changed: Notify,
    visitors_opened: Notify,
    returns_opened: Notify,
}

impl<P: Item> Monitor<P> {
    pub fn new(config: &FactoryConfig) -> Self {
        Self {
            state: Mutex::new(FactoryState::new(config)),
            store_changed: Notify::new(),
            visitors_opened: Notify::new(),
            returns_opened: Notify::new(),
        }
    }

    // A panicking actor cannot leave the state half-mutated: every mutation
    // completes inside one closure call, so a poisoned lock is still usable.
    pub(crate) fn lock(&self) -> MutexGuard<'_, FactoryState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn signal(&self, gate: Gate) -> &Notify {
        match gate {
            Gate::Visitors => &self.visitors_opened,
            Gate::Returns => &self.returns_opened,
        }
    }

    /// Reads the state without mutating it.
    pub fn inspect<R>(&self, read: impl FnOnce(&FactoryState<P>) -> R) -> R {
        read(&*self.lock())
    }

    /// Applies an unconditional mutation and wakes every waiter.
    pub fn mutate<R>(&self, apply: impl FnOnce(&mut FactoryState<P>) -> R) -> R {
        let mut state = self.lock();
        let outcome = apply(&mut state);
        state.debug_check_conservation();
        drop(state);
        self.store_changed.notify_waiters();
        outcome
    }

    /// Evaluates `attempt` once under the lock, never waiting.
    ///
    /// Waiters are only woken when the attempt was admitted (returned `Some`).
    pub fn try_admit<R>(&self, attempt: impl FnOnce(&mut FactoryState<P>) -> Option<R>) -> Option<R> {
        let mut state = self.lock();
        let outcome = attempt(&mut state)?;
        state.debug_check_conservation();
        drop(state);
        self.store_changed.notify_waiters();
        Some(outcome)
    }

    /// Re-evaluates `attempt` until it is admitted.
    ///
    /// The task sleeps between attempts until the store changes or one of
    /// the listed `gates` opens.
    pub async fn admit<R>(
        &self,
        operation: &'static str,
        gates: &[Gate],
        mut attempt: impl FnMut(&mut FactoryState<P>) -> Option<R>,
    ) -> R {
        let watch_visitors = gates.contains(&Gate::Visitors);
        let watch_returns = gates.contains(&Gate::Returns);
        loop {
            // Register before checking to avoid a lost wakeup between the
            // failed check and the await.
            let store_changed = self.store_changed.notified();
            let visitors_opened = self.visitors_opened.notified();
            let returns_opened = self.returns_opened.notified();

            if let Some(outcome) = self.try_admit(&mut attempt) {
                return outcome;
            }

            trace!(operation, "Waiting");
            tokio::select! {
                _ = store_changed => {}
                _ = visitors_opened, if watch_visitors => {}
                _ = returns_opened, if watch_returns => {}
            }
        }
    }

    /// [`admit`](Self::admit) bounded by an optional timeout.
    ///
    /// Timing out never leaves a partial mutation behind: an attempt either
    /// ran to completion under the lock or did not run at all.
    pub async fn admit_within<R>(
        &self,
        operation: &'static str,
        gates: &[Gate],
        timeout: Option<Duration>,
        attempt: impl FnMut(&mut FactoryState<P>) -> Option<R>,
    ) -> Result<R, FactoryError> {
        let admission = self.admit(operation, gates, attempt);
        match timeout {
            None => Ok(admission.await),
            Some(limit) => tokio::time::timeout(limit, admission).await.map_err(|_| {
                warn!(operation, ?limit, "Wait timed out");
                FactoryError::WaitTimedOut { operation }
            }),
        }
    }

    /// Opens or closes a gate. Opening broadcasts the gate's wake signal,
    /// even when the gate was already open.
    pub fn set_gate(&self, gate: Gate, open: bool) {
        let changed = self.lock().set_gate(gate, open);
        debug!(%gate, open, changed, "Gate set");
        if open {
            self.signal(gate).notify_waiters();
        }
    }

    /// Registers an active thief or company buyer.
    pub fn enter(self: &Arc<Self>, role: Role) -> ActivityGuard<P> {
        ActivityGuard::enter(Arc::clone(self), role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    fn monitor() -> Arc<Monitor<Product>> {
        Arc::new(Monitor::new(&FactoryConfig::default()))
    }

    #[tokio::test]
    async fn test_admit_wakes_on_store_change() {
        let monitor = monitor();

        let waiter = {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                monitor
                    .admit("take two", &[], |state| {
                        (state.available_len() >= 2).then(|| state.buy(2).len())
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        monitor.mutate(|state| state.produce(vec![Product::new(1, 1)]));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        monitor.mutate(|state| state.produce(vec![Product::new(2, 2)]));
        let taken = tokio::time::timeout(Duration::from_millis(500), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(taken, 2);
    }

    #[tokio::test]
    async fn test_admit_wakes_on_gate_open() {
        let monitor = monitor();
        monitor.set_gate(Gate::Returns, false);

        let waiter = {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                monitor
                    .admit("wait for returns", &[Gate::Returns], |state| {
                        state.is_open(Gate::Returns).then_some(())
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        monitor.set_gate(Gate::Returns, true);
        tokio::time::timeout(Duration::from_millis(500), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_admit_within_times_out() {
        let monitor = monitor();
        let err = monitor
            .admit_within("never", &[], Some(Duration::from_millis(20)), |_| None::<()>)
            .await
            .unwrap_err();
        assert_eq!(err, FactoryError::WaitTimedOut { operation: "never" });
    }

    #[tokio::test]
    async fn test_guard_releases_on_drop() {
        let monitor = monitor();
        let guard = monitor.enter(Role::Thief);
        assert_eq!(guard.role(), Role::Thief);
        assert!(!guard.is_released());
        assert_eq!(monitor.inspect(|s| s.active(Role::Thief)), 1);
        drop(guard);
        assert_eq!(monitor.inspect(|s| s.active(Role::Thief)), 0);
    }

    #[test]
    fn test_try_admit_refusal_leaves_state_alone() {
        let monitor = monitor();
        let refused = monitor.try_admit(|state| state.sell_one());
        assert!(refused.is_none());
        assert_eq!(monitor.inspect(|s| s.stats()), FactoryStats {
            visitors_open: true,
            returns_open: true,
            ..FactoryStats::default()
        });
    }
}
