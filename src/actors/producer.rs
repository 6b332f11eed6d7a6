use super::FactoryActor;
use crate::error::FactoryError;
use crate::model::Item;
use crate::monitor::Monitor;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Appends a batch of products to the tail of the store.
///
/// Production ignores both gates: a closed factory still accepts stock.
pub fn produce<P: Item>(monitor: &Monitor<P>, products: Vec<P>) {
    let count = products.len();
    let available = monitor.mutate(|state| {
        state.produce(products);
        state.available_len()
    });
    info!(count, available, "Produced");
}

pub struct Producer<P: Item> {
    monitor: Arc<Monitor<P>>,
    products: Vec<P>,
}

impl<P: Item> Producer<P> {
    pub fn new(monitor: Arc<Monitor<P>>, products: Vec<P>) -> Self {
        Self { monitor, products }
    }
}

#[async_trait]
impl<P: Item> FactoryActor for Producer<P> {
    type Output = ();

    async fn run(self) -> Result<(), FactoryError> {
        produce(&self.monitor, self.products);
        Ok(())
    }
}
