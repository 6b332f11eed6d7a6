//! # Product Factory Demo
//!
//! Drives one factory through a short day: production, a casual sale, a
//! theft while the factory is closed, and a company buyer's round trip.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! FACTORY_WAIT_TIMEOUT_MS=2000 RUST_LOG=debug cargo run
//! ```

use product_factory::lifecycle::setup_tracing;
use product_factory::{ActorId, Factory, FactoryConfig, Product};
use std::time::Duration;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = FactoryConfig::from_env()?;
    let factory = Factory::<Product>::with_config(config);

    let span = tracing::info_span!("production");
    async {
        let products = (1..=5).map(|id| Product::new(id, i64::from(id) * 10)).collect();
        factory.start_production(products, ActorId(1))?;
        factory.finish_production(ActorId(1)).await
    }
    .instrument(span)
    .await?;

    factory.start_simple_buyer(ActorId(2))?;
    match factory.finish_simple_buyer(ActorId(2)).await? {
        Some(id) => info!(%id, "Casual buyer got a product"),
        None => info!("Casual buyer left empty-handed"),
    }

    // The thief waits at the closed door.
    factory.close_factory();
    factory.start_thief(3, ActorId(66))?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    info!(stolen = factory.stats().stolen, "Thief still outside");
    factory.open_factory();
    let stolen = factory.finish_thief(ActorId(66)).await?;
    info!(stolen, "Thief got away");

    factory.start_company_buyer(1, 0, ActorId(4))?;
    let returned = factory.finish_company_buyer(ActorId(4)).await?;
    info!(returned, "Company buyer done");

    for record in factory.list_stolen_products() {
        info!(product = %record.product.id, thief = %record.thief, "Stolen");
    }
    let stats = factory.stats();
    info!(?stats, conserved = stats.is_conserved(), "Final state");
    Ok(())
}
