use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Caller-chosen identifier of an actor task.
///
/// Ids only need to be unique among in-flight actors of the same kind, so a
/// producer and a thief may both be `actor_1`. Thieves also use their id as
/// the "fake id" their loot is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl From<u32> for ActorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor_{}", self.0)
    }
}
