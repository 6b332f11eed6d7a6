use super::{ActorId, Item};
use serde::{Deserialize, Serialize};

/// One stolen unit, attributed to the thief that took it.
///
/// The stolen record is append-only and ordered by theft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StolenRecord<P: Item> {
    pub product: P,
    pub thief: ActorId,
}

impl<P: Item> StolenRecord<P> {
    pub fn new(product: P, thief: ActorId) -> Self {
        Self { product, thief }
    }
}
