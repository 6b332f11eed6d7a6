//! # Actor Protocols
//!
//! The four kinds of actor that visit the factory. Each one expresses its
//! admission rule and its mutation entirely through the
//! [`Monitor`](crate::monitor::Monitor); none of them touches shared state any
//! other way.
//!
//! | Actor | Waits? | Admitted when | Result |
//! |---|---|---|---|
//! | [`Producer`] | never | always | `()` |
//! | [`SimpleBuyer`] | never (probe) | visitors gate open, no thief or company buyer active, stock left | bought id or `None` |
//! | [`CompanyBuyer`] | yes, twice | see [`CompanyVisit`] | units returned |
//! | [`Thief`] | yes | visitors gate open | units stolen |
//!
//! ## Generics
//!
//! Every actor implements [`FactoryActor`], so the
//! [`TaskRegistry`](crate::lifecycle::TaskRegistry) that starts and joins them
//! is written once and parameterized only by the actor's `Output`.

pub mod company_buyer;
pub mod producer;
pub mod simple_buyer;
pub mod thief;

pub use company_buyer::*;
pub use producer::*;
pub use simple_buyer::*;
pub use thief::*;

use crate::error::FactoryError;
use async_trait::async_trait;
use std::fmt::Debug;

/// A task body that runs to completion against a shared
/// [`Monitor`](crate::monitor::Monitor).
///
/// Each actor owns its handle on the monitor (directly, or through its
/// [`ActivityGuard`](crate::monitor::ActivityGuard)), so the registry that
/// spawns it never needs to know which factory it belongs to.
///
/// There is no cancellation: once started, an actor runs until its protocol
/// finishes (or its configured wait timeout expires).
#[async_trait]
pub trait FactoryActor: Send + 'static {
    /// What `finish_*` hands back to the caller.
    type Output: Debug + Send + 'static;

    async fn run(self) -> Result<Self::Output, FactoryError>;
}
