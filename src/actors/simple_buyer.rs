use super::FactoryActor;
use crate::error::FactoryError;
use crate::model::Item;
use crate::monitor::{Gate, Monitor, Role};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Tries to buy the head unit without ever waiting.
///
/// Refused (returns `None`) when the factory is closed to visitors, when a
/// thief or company buyer is active, or when the store is empty. A refusal is
/// not a fault; the caller may simply try again later.
pub fn try_buy_one<P: Item>(monitor: &Monitor<P>) -> Option<P::Id> {
    let bought = monitor.try_admit(|state| {
        let admitted = state.is_open(Gate::Visitors)
            && state.active(Role::CompanyBuyer) == 0
            && state.active(Role::Thief) == 0;
        if !admitted {
            return None;
        }
        state.sell_one()
    });
    match &bought {
        Some(id) => info!(%id, "Bought one"),
        None => debug!("Purchase refused"),
    }
    bought
}

/// A single [`try_buy_one`] attempt run as a task.
pub struct SimpleBuyer<P: Item> {
    monitor: Arc<Monitor<P>>,
}

impl<P: Item> SimpleBuyer<P> {
    pub fn new(monitor: Arc<Monitor<P>>) -> Self {
        Self { monitor }
    }
}

#[async_trait]
impl<P: Item> FactoryActor for SimpleBuyer<P> {
    type Output = Option<P::Id>;

    async fn run(self) -> Result<Option<P::Id>, FactoryError> {
        Ok(try_buy_one(&self.monitor))
    }
}
