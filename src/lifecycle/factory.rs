use crate::actors::{self, CompanyBuyer, CompanyVisit, Producer, SimpleBuyer, Thief};
use crate::config::FactoryConfig;
use crate::error::FactoryError;
use crate::lifecycle::TaskRegistry;
use crate::model::{ActorId, Item, Product, StolenRecord};
use crate::monitor::{FactoryStats, Gate, Monitor, Role};
use std::sync::Arc;
use tracing::{debug, info};

/// Generates `finish_<name>`: waits for the actor registered under `id` in
/// `$registry` and returns its result.
macro_rules! finish_actor {
    ($(#[$meta:meta])* $name:ident, $registry:ident -> $output:ty) => {
        paste::paste! {
            $(#[$meta])*
            pub async fn [<finish_ $name>](&self, id: ActorId) -> Result<$output, FactoryError> {
                self.$registry.finish(id).await
            }
        }
    };
}

/// The shared product factory.
///
/// `Factory` is responsible for:
/// - **Coordination**: owning the [`Monitor`] every actor synchronizes on
/// - **Lifecycle Management**: starting actor tasks and joining them by id
/// - **Gates**: opening and closing the factory and its returning service
///
/// # Architecture
///
/// Four kinds of actor share one store:
/// - **Producers** append stock, always admitted
/// - **Simple buyers** probe for a single unit and never wait
/// - **Company buyers** buy a batch, filter it, and return the cheap part
/// - **Thieves** take what they can once the factory is open
///
/// Every `start_*` spawns a task on the current Tokio runtime and returns
/// immediately; the matching `finish_*` waits for that task and hands back its
/// result. Ids only need to be unique per actor kind.
///
/// # Example
///
/// ```ignore
/// let factory = Factory::<Product>::new();
/// let producer = ActorId(1);
/// factory.start_production((1..=5).map(|i| Product::new(i, 10)).collect(), producer)?;
/// factory.finish_production(producer).await?;
///
/// factory.start_thief(3, ActorId(7))?;
/// assert_eq!(factory.finish_thief(ActorId(7)).await?, 3);
/// ```
pub struct Factory<P: Item = Product> {
    monitor: Arc<Monitor<P>>,
    config: FactoryConfig,
    producers: TaskRegistry<()>,
    simple_buyers: TaskRegistry<Option<P::Id>>,
    company_buyers: TaskRegistry<usize>,
    thieves: TaskRegistry<usize>,
}

impl<P: Item> Default for Factory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Item> Factory<P> {
    /// Creates a factory with both gates open and unbounded waits.
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    pub fn with_config(config: FactoryConfig) -> Self {
        info!(?config, "Factory created");
        Self {
            monitor: Arc::new(Monitor::new(&config)),
            config,
            producers: TaskRegistry::new("producer"),
            simple_buyers: TaskRegistry::new("simple buyer"),
            company_buyers: TaskRegistry::new("company buyer"),
            thieves: TaskRegistry::new("thief"),
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    // =========================================================================
    // Producers
    // =========================================================================

    /// Starts a producer that appends `products` to the store.
    pub fn start_production(&self, products: Vec<P>, id: ActorId) -> Result<(), FactoryError> {
        debug!(%id, count = products.len(), "start_production called");
        self.producers
            .launch(id, Producer::new(Arc::clone(&self.monitor), products))
    }

    /// Appends `products` to the tail of the store, regardless of gates.
    pub fn produce(&self, products: Vec<P>) {
        actors::produce(&self.monitor, products);
    }

    finish_actor!(
        /// Waits for a producer to finish.
        production, producers -> ()
    );

    // =========================================================================
    // Simple buyers
    // =========================================================================

    /// Starts a simple buyer, which makes a single [`try_buy_one`](Self::try_buy_one) attempt.
    pub fn start_simple_buyer(&self, id: ActorId) -> Result<(), FactoryError> {
        self.simple_buyers
            .launch(id, SimpleBuyer::new(Arc::clone(&self.monitor)))
    }

    /// Buys the head unit if a simple sale is allowed right now. Never waits.
    pub fn try_buy_one(&self) -> Option<P::Id> {
        actors::try_buy_one(&self.monitor)
    }

    finish_actor!(
        /// Waits for a simple buyer; `None` means its attempt was refused.
        simple_buyer, simple_buyers -> Option<P::Id>
    );

    // =========================================================================
    // Company buyers
    // =========================================================================

    /// Starts a company buyer that buys `count` units, keeps those worth at
    /// least `min_value` and returns the rest.
    ///
    /// The store is reserved against simple sales before this returns.
    pub fn start_company_buyer(
        &self,
        count: usize,
        min_value: i64,
        id: ActorId,
    ) -> Result<(), FactoryError> {
        debug!(%id, count, min_value, "start_company_buyer called");
        let visit = self.company_visit(id);
        self.company_buyers
            .launch(id, CompanyBuyer::new(visit, count, min_value))
    }

    /// Begins a hand-driven company visit: call
    /// [`buy_products`](CompanyVisit::buy_products), filter, then
    /// [`return_products`](CompanyVisit::return_products).
    pub fn company_visit(&self, id: ActorId) -> CompanyVisit<P> {
        CompanyVisit::begin(&self.monitor, id, self.config.wait_timeout())
    }

    finish_actor!(
        /// Waits for a company buyer and returns how many units it returned.
        company_buyer, company_buyers -> usize
    );

    // =========================================================================
    // Thieves
    // =========================================================================

    /// Starts a thief that steals up to `count` units under `fake_id`.
    ///
    /// The thief counts as active before this returns.
    pub fn start_thief(&self, count: usize, fake_id: ActorId) -> Result<(), FactoryError> {
        debug!(thief = %fake_id, count, "start_thief called");
        let guard = self.monitor.enter(Role::Thief);
        let thief = Thief::new(guard, count, fake_id, self.config.wait_timeout());
        self.thieves.launch(fake_id, thief)
    }

    /// Steals up to `count` units in the caller's task.
    pub async fn steal_products(&self, count: usize, fake_id: ActorId) -> Result<usize, FactoryError> {
        let guard = self.monitor.enter(Role::Thief);
        actors::steal_products(guard, count, fake_id, self.config.wait_timeout()).await
    }

    finish_actor!(
        /// Waits for a thief and returns how many units it stole.
        thief, thieves -> usize
    );

    // =========================================================================
    // Gates
    // =========================================================================

    pub fn open_factory(&self) {
        info!("Opening factory");
        self.monitor.set_gate(Gate::Visitors, true);
    }

    pub fn close_factory(&self) {
        info!("Closing factory");
        self.monitor.set_gate(Gate::Visitors, false);
    }

    pub fn open_returning_service(&self) {
        info!("Opening returning service");
        self.monitor.set_gate(Gate::Returns, true);
    }

    pub fn close_returning_service(&self) {
        info!("Closing returning service");
        self.monitor.set_gate(Gate::Returns, false);
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Copies the store, head first.
    pub fn list_available_products(&self) -> Vec<P> {
        self.monitor.inspect(|state| state.available())
    }

    /// Copies the stolen record, in theft order.
    pub fn list_stolen_products(&self) -> Vec<StolenRecord<P>> {
        self.monitor.inspect(|state| state.stolen())
    }

    pub fn stats(&self) -> FactoryStats {
        self.monitor.inspect(|state| state.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductId;
    use std::time::Duration;

    fn products(ids: std::ops::RangeInclusive<u32>) -> Vec<Product> {
        ids.map(|id| Product::new(id, id as i64 * 10)).collect()
    }

    #[tokio::test]
    async fn test_simple_buyer_refusals() {
        let factory = Factory::<Product>::new();
        assert_eq!(factory.try_buy_one(), None, "empty store");

        factory.produce(products(1..=2));
        factory.close_factory();
        assert_eq!(factory.try_buy_one(), None, "factory closed");
        factory.open_factory();

        let visit = factory.company_visit(ActorId(1));
        assert_eq!(factory.try_buy_one(), None, "company buyer active");
        drop(visit);

        let guard = factory.monitor.enter(Role::Thief);
        assert_eq!(factory.try_buy_one(), None, "thief active");
        drop(guard);

        assert_eq!(factory.try_buy_one(), Some(ProductId(1)));
        assert_eq!(factory.stats().sold, 1);
    }

    #[tokio::test]
    async fn test_generated_finish_rejects_unknown_ids() {
        let factory = Factory::<Product>::new();
        assert_eq!(
            factory.finish_production(ActorId(3)).await.unwrap_err(),
            FactoryError::UnknownActor { kind: "producer", id: ActorId(3) }
        );
        assert!(matches!(
            factory.finish_simple_buyer(ActorId(3)).await,
            Err(FactoryError::UnknownActor { kind: "simple buyer", .. })
        ));
        assert!(matches!(
            factory.finish_company_buyer(ActorId(3)).await,
            Err(FactoryError::UnknownActor { kind: "company buyer", .. })
        ));
        assert!(matches!(
            factory.finish_thief(ActorId(3)).await,
            Err(FactoryError::UnknownActor { kind: "thief", .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_thief_releases_its_reservation() {
        let factory = Factory::<Product>::new();
        factory.close_factory();
        factory.start_thief(1, ActorId(5)).unwrap();
        assert_eq!(factory.stats().active_thieves, 1);

        let err = factory.start_thief(1, ActorId(5)).unwrap_err();
        assert_eq!(err, FactoryError::DuplicateActor { kind: "thief", id: ActorId(5) });
        assert_eq!(factory.stats().active_thieves, 1);

        factory.open_factory();
        assert_eq!(factory.finish_thief(ActorId(5)).await.unwrap(), 0);
        assert_eq!(factory.stats().active_thieves, 0);
    }

    #[tokio::test]
    async fn test_abandoned_finish_leaves_thief_finishable() {
        let factory = Factory::<Product>::new();
        factory.produce(products(1..=2));
        factory.close_factory();
        factory.start_thief(1, ActorId(7)).unwrap();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), factory.finish_thief(ActorId(7))).await;
        assert!(abandoned.is_err());
        assert_eq!(factory.stats().active_thieves, 1);

        // Still in flight, so the id is still taken.
        let err = factory.start_thief(1, ActorId(7)).unwrap_err();
        assert_eq!(err, FactoryError::DuplicateActor { kind: "thief", id: ActorId(7) });
        assert_eq!(factory.stats().active_thieves, 1);

        factory.open_factory();
        let stolen = tokio::time::timeout(Duration::from_secs(1), factory.finish_thief(ActorId(7)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stolen, 1);
        assert_eq!(factory.stats().active_thieves, 0);
    }

    #[test]
    fn test_config_is_kept() {
        let config = FactoryConfig {
            returns_open: false,
            ..FactoryConfig::default()
        }
        .with_wait_timeout(Duration::from_millis(40));
        let factory = Factory::<Product>::with_config(config.clone());
        assert_eq!(factory.config(), &config);
        assert!(!factory.stats().returns_open);
        assert!(factory.stats().visitors_open);
    }
}
