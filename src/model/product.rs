/// Represents a unit produced by the factory.
///
/// # Item Contract
/// This struct implements the [`Item`] trait, which is all the
/// [`Factory`](crate::lifecycle::Factory) needs from a product: a stable id
/// and a numeric value. Products are immutable once produced and move by
/// value between the store and the actors.
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Contract the factory requires from the products it coordinates.
///
/// Implementors must be cheap to clone: snapshots of the store hand out copies.
pub trait Item: Clone + Debug + Send + Sync + 'static {
    /// Stable identity of a unit (what a simple buyer receives).
    type Id: Clone + Debug + Display + Eq + Hash + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// The numeric value company buyers filter on.
    fn value(&self) -> i64;
}

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub value: i64,
}

impl Product {
    /// Creates a new Product instance.
    ///
    /// # Arguments
    /// * `id` - Identifier reported to simple buyers
    /// * `value` - Value compared against a company buyer's `min_value`
    pub fn new(id: u32, value: i64) -> Self {
        Self {
            id: ProductId(id),
            value,
        }
    }
}

impl Item for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn value(&self) -> i64 {
        self.value
    }
}
