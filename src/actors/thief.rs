use super::FactoryActor;
use crate::error::FactoryError;
use crate::model::{ActorId, Item};
use crate::monitor::{ActivityGuard, Gate};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Steals up to `count` units from the head of the store.
///
/// Only the visitors gate is waited on. A thief ignores company buyers and
/// never waits for stock: it takes what is there, possibly nothing. Every
/// stolen unit is recorded under `fake_id`. The guard's activity ends in the
/// same critical section as the theft.
pub async fn steal_products<P: Item>(
    mut guard: ActivityGuard<P>,
    count: usize,
    fake_id: ActorId,
    wait_timeout: Option<Duration>,
) -> Result<usize, FactoryError> {
    let monitor = Arc::clone(guard.monitor());
    let (stolen, available) = monitor
        .admit_within("steal products", &[Gate::Visitors], wait_timeout, |state| {
            if !state.is_open(Gate::Visitors) {
                return None;
            }
            let stolen = state.steal(count, fake_id);
            guard.release(state);
            Some((stolen, state.available_len()))
        })
        .await?;
    info!(thief = %fake_id, requested = count, stolen, available, "Stole products");
    Ok(stolen)
}

pub struct Thief<P: Item> {
    guard: ActivityGuard<P>,
    count: usize,
    fake_id: ActorId,
    wait_timeout: Option<Duration>,
}

impl<P: Item> Thief<P> {
    /// The guard must already be registered, so the thief counts as active
    /// from the moment it is created.
    pub fn new(guard: ActivityGuard<P>, count: usize, fake_id: ActorId, wait_timeout: Option<Duration>) -> Self {
        Self {
            guard,
            count,
            fake_id,
            wait_timeout,
        }
    }
}

#[async_trait]
impl<P: Item> FactoryActor for Thief<P> {
    type Output = usize;

    async fn run(self) -> Result<usize, FactoryError> {
        steal_products(self.guard, self.count, self.fake_id, self.wait_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use crate::model::Product;
    use crate::monitor::{Monitor, Role};

    #[tokio::test]
    async fn test_steal_takes_best_effort_prefix() {
        let monitor = Arc::new(Monitor::new(&FactoryConfig::default()));
        crate::actors::produce(&monitor, vec![Product::new(1, 1), Product::new(2, 2)]);

        let guard = monitor.enter(Role::Thief);
        let stolen = steal_products(guard, 5, ActorId(42), None).await.unwrap();
        assert_eq!(stolen, 2);

        let records = monitor.inspect(|s| s.stolen());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.thief == ActorId(42)));
        assert_eq!(monitor.inspect(|s| s.active(Role::Thief)), 0);
    }

    #[tokio::test]
    async fn test_steal_from_empty_store_is_zero() {
        let monitor: Arc<Monitor<Product>> = Arc::new(Monitor::new(&FactoryConfig::default()));
        let guard = monitor.enter(Role::Thief);
        assert_eq!(steal_products(guard, 3, ActorId(1), None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_timed_out_thief_is_no_longer_active() {
        let config = FactoryConfig {
            visitors_open: false,
            ..FactoryConfig::default()
        };
        let monitor: Arc<Monitor<Product>> = Arc::new(Monitor::new(&config));
        let guard = monitor.enter(Role::Thief);
        let err = steal_products(guard, 3, ActorId(1), Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert_eq!(err, FactoryError::WaitTimedOut { operation: "steal products" });
        assert_eq!(monitor.inspect(|s| s.active(Role::Thief)), 0);
    }
}
