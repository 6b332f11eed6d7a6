#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Product Factory
//!
//! > **A shared, in-memory product store coordinated across concurrent actors.**
//!
//! Producers, simple buyers, company buyers and thieves all run as Tokio tasks
//! around a single collection of products. Who may touch the store, and when,
//! depends on two admission gates (factory open to visitors, returning service
//! open) and on which other actors are active.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One Monitor
//!
//! All shared state (the store, the stolen record, the gates and the activity
//! counters) sits behind **one** lock. Each operation makes exactly one
//! acquire/release pair, evaluates its whole admission predicate under it, and
//! broadcasts a wake signal after every change. There is no second lock to
//! take in the wrong order and no counter read outside the critical section.
//!
//! ### Asymmetric Actors
//!
//! - **Producers** are always admitted.
//! - **Simple buyers** *probe*: they never wait, and a refusal is an ordinary
//!   `None`, not an error.
//! - **Company buyers** and **thieves** *block* until their predicate holds.
//!
//! ### Managed Tasks
//!
//! `start_*` spawns a task and returns; `finish_*` joins it and returns its
//! result. One generic [`TaskRegistry`](lifecycle::TaskRegistry) does this for
//! every actor kind.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Core ([`monitor`])
//! - **Role**: The lock, the wake signals, and the guarded [`FactoryState`](monitor::FactoryState).
//! - **Key items**: [`Monitor`](monitor::Monitor), [`Gate`](monitor::Gate), [`ActivityGuard`](monitor::ActivityGuard).
//!
//! ### 2. The Protocols ([`actors`])
//! - **Role**: What each kind of actor waits for and what it changes.
//! - **Key items**: [`FactoryActor`](actors::FactoryActor), [`CompanyVisit`](actors::CompanyVisit).
//!
//! ### 3. The Facade ([`lifecycle`])
//! - **Role**: Start/finish pairs, gate toggles, snapshots, logging setup.
//! - **Key items**: [`Factory`](lifecycle::Factory), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ### 4. The Data ([`model`])
//! - **Role**: The [`Item`](model::Item) contract and the stock [`Product`](model::Product).
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### FIFO Store
//! Units leave from the head in production order. Company buyers' returns go
//! back to the tail.
//!
//! ### Accounting
//! Every produced unit is in exactly one place: available, stolen, sold, kept
//! by a company, or held by a company mid-visit. [`Factory::stats`](lifecycle::Factory::stats)
//! reports all five, and debug builds check the sum after every mutation.
//!
//! ### Liveness
//! A blocked actor waits until another actor changes the state it depends on.
//! A company buyer can starve while thieves drain the store; set
//! [`FactoryConfig::wait_timeout_ms`](config::FactoryConfig::wait_timeout_ms)
//! to bound admission waits.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo scenario with info logs
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod actors;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod monitor;

pub use config::FactoryConfig;
pub use error::FactoryError;
pub use lifecycle::Factory;
pub use model::{ActorId, Item, Product, ProductId, StolenRecord};
