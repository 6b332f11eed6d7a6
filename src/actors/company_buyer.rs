//! # Company Buyer
//!
//! A company buyer buys a batch, filters it, and hands the unwanted part back.
//! The whole round trip happens inside a [`CompanyVisit`], which keeps the
//! store reserved against simple sales from the moment the visit begins until
//! the return is settled:
//!
//! 1. **Buy** ([`CompanyVisit::buy_products`]): waits until the factory is
//!    open, no thief is active and at least `count` units are in stock, then
//!    takes `count` units from the head.
//! 2. **Filter** ([`filter_batch`]): keeps units worth at least `min_value`,
//!    marks the rest for return. Runs outside the lock.
//! 3. **Return** ([`CompanyVisit::return_products`]): waits until the factory
//!    and the returning service are both open and no thief is active, then
//!    appends the returned units to the tail and ends the visit.
//!
//! A company buyer waiting for `count` units can starve if thieves keep
//! draining the store. That is accepted: it is latency, not a broken invariant.

use super::FactoryActor;
use crate::error::FactoryError;
use crate::model::{ActorId, Item};
use crate::monitor::{ActivityGuard, Gate, Monitor, Role};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Splits a bought batch into `(kept, to_return)`, preserving order.
///
/// A unit is kept when `value >= min_value`.
pub fn filter_batch<P: Item>(batch: Vec<P>, min_value: i64) -> (Vec<P>, Vec<P>) {
    batch.into_iter().partition(|product| product.value() >= min_value)
}

/// A company buyer's reservation of the store.
///
/// While a visit is alive, simple buyers are refused. Ending the visit with
/// [`return_products`](Self::return_products) settles the purchase; dropping
/// it instead counts every unit still held as kept.
pub struct CompanyVisit<P: Item> {
    id: ActorId,
    guard: ActivityGuard<P>,
    bought: usize,
    wait_timeout: Option<Duration>,
}

impl<P: Item> CompanyVisit<P> {
    pub(crate) fn begin(monitor: &Arc<Monitor<P>>, id: ActorId, wait_timeout: Option<Duration>) -> Self {
        let guard = monitor.enter(Role::CompanyBuyer);
        debug!(%id, "Company visit started");
        Self {
            id,
            guard,
            bought: 0,
            wait_timeout,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Units bought during this visit and not yet settled.
    pub fn bought(&self) -> usize {
        self.bought
    }

    /// Blocks until `count` units can be bought, then takes them from the head.
    pub async fn buy_products(&mut self, count: usize) -> Result<Vec<P>, FactoryError> {
        let monitor = Arc::clone(self.guard.monitor());
        let batch = monitor
            .admit_within("buy products", &[Gate::Visitors], self.wait_timeout, |state| {
                let admitted = state.is_open(Gate::Visitors)
                    && state.active(Role::Thief) == 0
                    && state.available_len() >= count;
                admitted.then(|| state.buy(count))
            })
            .await?;
        self.bought += batch.len();
        info!(id = %self.id, count, "Bought batch");
        Ok(batch)
    }

    /// Blocks until the returning service accepts `products`, appends them to
    /// the tail of the store and ends the visit. Returns how many went back.
    ///
    /// This wait is never timed out: giving up here would lose the units.
    pub async fn return_products(mut self, products: Vec<P>) -> Result<usize, FactoryError> {
        let returned = products.len();
        let bought = self.bought;
        if returned > bought {
            return Err(FactoryError::ReturnExceedsPurchase { returned, bought });
        }

        let monitor = Arc::clone(self.guard.monitor());
        let guard = &mut self.guard;
        let mut pending = Some(products);
        let available = monitor
            .admit("return products", &[Gate::Visitors, Gate::Returns], |state| {
                let admitted = state.is_open(Gate::Visitors)
                    && state.is_open(Gate::Returns)
                    && state.active(Role::Thief) == 0;
                if !admitted {
                    return None;
                }
                state.restock(pending.take().unwrap_or_default(), bought);
                guard.release(state);
                Some(state.available_len())
            })
            .await;
        self.bought = 0;

        info!(id = %self.id, returned, kept = bought - returned, available, "Returned products");
        Ok(returned)
    }
}

impl<P: Item> Drop for CompanyVisit<P> {
    fn drop(&mut self) {
        if self.guard.is_released() {
            return;
        }
        let held = self.bought;
        let monitor = Arc::clone(self.guard.monitor());
        let guard = &mut self.guard;
        monitor.mutate(|state| {
            state.restock(Vec::new(), held);
            guard.release(state);
        });
        debug!(id = %self.id, kept = held, "Company visit abandoned");
    }
}

/// The full buy, filter, return round trip as one task.
pub struct CompanyBuyer<P: Item> {
    visit: CompanyVisit<P>,
    count: usize,
    min_value: i64,
}

impl<P: Item> CompanyBuyer<P> {
    pub fn new(visit: CompanyVisit<P>, count: usize, min_value: i64) -> Self {
        Self {
            visit,
            count,
            min_value,
        }
    }
}

#[async_trait]
impl<P: Item> FactoryActor for CompanyBuyer<P> {
    type Output = usize;

    async fn run(self) -> Result<usize, FactoryError> {
        let mut visit = self.visit;
        let batch = visit.buy_products(self.count).await?;
        let (kept, to_return) = filter_batch(batch, self.min_value);
        debug!(kept = kept.len(), to_return = to_return.len(), min_value = self.min_value, "Filtered batch");
        visit.return_products(to_return).await
    }
}
