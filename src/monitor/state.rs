//! # Factory State
//!
//! Everything the monitor guards, as plain data: the product store, the gate
//! flags, the activity counters and the accounting counters. Nothing in here
//! locks or waits; the [`Monitor`](super::Monitor) hands out `&mut FactoryState`
//! only inside its critical section.

use super::activity::Role;
use super::gate::Gate;
use crate::config::FactoryConfig;
use crate::model::{ActorId, Item, StolenRecord};
use serde::Serialize;
use std::collections::VecDeque;

/// Point-in-time counters describing where every produced unit is.
///
/// `produced == available + stolen + sold + kept_by_companies + held_by_companies`
/// holds for every snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FactoryStats {
    pub produced: usize,
    pub available: usize,
    pub stolen: usize,
    /// Units sold one at a time to simple buyers.
    pub sold: usize,
    /// Units company buyers bought and did not return.
    pub kept_by_companies: usize,
    /// Units bought by company buyers whose return is still pending.
    pub held_by_companies: usize,
    pub active_thieves: usize,
    pub active_company_buyers: usize,
    pub visitors_open: bool,
    pub returns_open: bool,
}

impl FactoryStats {
    pub fn is_conserved(&self) -> bool {
        self.produced
            == self.available
                + self.stolen
                + self.sold
                + self.kept_by_companies
                + self.held_by_companies
    }
}

#[derive(Debug)]
pub struct FactoryState<P: Item> {
    /// FIFO: the head is the oldest unit.
    available: VecDeque<P>,
    stolen: Vec<StolenRecord<P>>,
    visitors_open: bool,
    returns_open: bool,
    active_thieves: usize,
    active_company_buyers: usize,
    produced: usize,
    sold: usize,
    kept_by_companies: usize,
    held_by_companies: usize,
}

impl<P: Item> FactoryState<P> {
    pub(crate) fn new(config: &FactoryConfig) -> Self {
        Self {
            available: VecDeque::new(),
            stolen: Vec::new(),
            visitors_open: config.visitors_open,
            returns_open: config.returns_open,
            active_thieves: 0,
            active_company_buyers: 0,
            produced: 0,
            sold: 0,
            kept_by_companies: 0,
            held_by_companies: 0,
        }
    }

    // --- Reads ---

    pub fn is_open(&self, gate: Gate) -> bool {
        match gate {
            Gate::Visitors => self.visitors_open,
            Gate::Returns => self.returns_open,
        }
    }

    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    pub fn active(&self, role: Role) -> usize {
        match role {
            Role::Thief => self.active_thieves,
            Role::CompanyBuyer => self.active_company_buyers,
        }
    }

    pub fn available(&self) -> Vec<P> {
        self.available.iter().cloned().collect()
    }

    pub fn stolen(&self) -> Vec<StolenRecord<P>> {
        self.stolen.clone()
    }

    pub fn stats(&self) -> FactoryStats {
        FactoryStats {
            produced: self.produced,
            available: self.available.len(),
            stolen: self.stolen.len(),
            sold: self.sold,
            kept_by_companies: self.kept_by_companies,
            held_by_companies: self.held_by_companies,
            active_thieves: self.active_thieves,
            active_company_buyers: self.active_company_buyers,
            visitors_open: self.visitors_open,
            returns_open: self.returns_open,
        }
    }

    // --- Gates & activity ---

    /// Sets a gate, returning whether the flag actually flipped.
    pub(crate) fn set_gate(&mut self, gate: Gate, open: bool) -> bool {
        let flag = match gate {
            Gate::Visitors => &mut self.visitors_open,
            Gate::Returns => &mut self.returns_open,
        };
        let changed = *flag != open;
        *flag = open;
        changed
    }

    pub(crate) fn enter(&mut self, role: Role) {
        match role {
            Role::Thief => self.active_thieves += 1,
            Role::CompanyBuyer => self.active_company_buyers += 1,
        }
    }

    pub(crate) fn leave(&mut self, role: Role) {
        let counter = match role {
            Role::Thief => &mut self.active_thieves,
            Role::CompanyBuyer => &mut self.active_company_buyers,
        };
        debug_assert!(*counter > 0, "{role} counter underflow");
        *counter = counter.saturating_sub(1);
    }

    // --- Store mutations ---

    pub(crate) fn produce(&mut self, products: Vec<P>) {
        self.produced += products.len();
        self.available.extend(products);
    }

    /// Sells the head unit, if any.
    pub(crate) fn sell_one(&mut self) -> Option<P::Id> {
        let product = self.available.pop_front()?;
        self.sold += 1;
        Some(product.id())
    }

    /// Hands the first `count` units to a company buyer. The caller checks
    /// availability first.
    pub(crate) fn buy(&mut self, count: usize) -> Vec<P> {
        let batch: Vec<P> = self.available.drain(..count).collect();
        self.held_by_companies += batch.len();
        batch
    }

    /// Takes up to `count` units from the head, attributing each to `thief`.
    pub(crate) fn steal(&mut self, count: usize, thief: ActorId) -> usize {
        let take = count.min(self.available.len());
        self.stolen.extend(
            self.available
                .drain(..take)
                .map(|product| StolenRecord::new(product, thief)),
        );
        take
    }

    /// Settles a company buyer's purchase of `bought` units: `returned` go
    /// back to the tail of the store, the rest are kept.
    pub(crate) fn restock(&mut self, returned: Vec<P>, bought: usize) {
        let kept = bought - returned.len();
        self.held_by_companies -= bought;
        self.kept_by_companies += kept;
        self.available.extend(returned);
    }

    pub(crate) fn debug_check_conservation(&self) {
        debug_assert!(
            self.stats().is_conserved(),
            "product accounting broken: {:?}",
            self.stats()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, ProductId};

    fn state_with(values: &[i64]) -> FactoryState<Product> {
        let mut state = FactoryState::new(&FactoryConfig::default());
        let products = values
            .iter()
            .enumerate()
            .map(|(i, value)| Product::new(i as u32 + 1, *value))
            .collect();
        state.produce(products);
        state
    }

    #[test]
    fn test_store_is_fifo() {
        let mut state = state_with(&[10, 20, 30]);
        assert_eq!(state.sell_one(), Some(ProductId(1)));
        let batch = state.buy(1);
        assert_eq!(batch[0].id, ProductId(2));
        state.restock(batch, 1);
        let ids: Vec<_> = state.available().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId(3), ProductId(2)]);
        assert!(state.stats().is_conserved());
    }

    #[test]
    fn test_steal_saturates() {
        let mut state = state_with(&[1, 2]);
        assert_eq!(state.steal(5, ActorId(9)), 2);
        assert_eq!(state.steal(5, ActorId(9)), 0);
        let stolen = state.stolen();
        assert_eq!(stolen.len(), 2);
        assert!(stolen.iter().all(|r| r.thief == ActorId(9)));
        assert_eq!(stolen[0].product.id, ProductId(1));
    }

    #[test]
    fn test_restock_counts_kept_units() {
        let mut state = state_with(&[5, 50, 500]);
        let batch = state.buy(3);
        assert_eq!(state.stats().held_by_companies, 3);
        let returned: Vec<_> = batch.into_iter().filter(|p| p.value < 50).collect();
        state.restock(returned, 3);
        let stats = state.stats();
        assert_eq!(stats.held_by_companies, 0);
        assert_eq!(stats.kept_by_companies, 2);
        assert_eq!(stats.available, 1);
        assert!(stats.is_conserved());
    }

    #[test]
    fn test_set_gate_reports_flips() {
        let mut state = state_with(&[]);
        assert!(!state.set_gate(Gate::Returns, true));
        assert!(state.set_gate(Gate::Returns, false));
        assert!(!state.is_open(Gate::Returns));
        assert!(state.is_open(Gate::Visitors));
    }
}
