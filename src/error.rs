//! # Factory Errors
//!
//! This module defines the error type shared by the factory facade, the task
//! registry and the actor bodies.
//!
//! A casual buyer failing to buy is **not** an error: `try_buy_one` returns
//! `None` and the caller simply tries again later. Likewise a blocking actor
//! waiting on its admission predicate is just latency, unless a wait timeout
//! was configured.

use crate::model::ActorId;
use thiserror::Error;

/// Errors that can occur while driving the factory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FactoryError {
    /// `start_*` was called with an id that is still in flight for that kind.
    #[error("{kind} {id} is already running")]
    DuplicateActor { kind: &'static str, id: ActorId },

    /// `finish_*` was called for an id that was never started or already finished.
    #[error("no running {kind} with id {id}")]
    UnknownActor { kind: &'static str, id: ActorId },

    /// The actor task panicked or was aborted before producing a result.
    #[error("{kind} {id} failed: {reason}")]
    ActorFailed {
        kind: &'static str,
        id: ActorId,
        reason: String,
    },

    /// A bounded admission wait expired before the predicate held.
    #[error("timed out waiting to {operation}")]
    WaitTimedOut { operation: &'static str },

    /// A company buyer tried to hand back more units than it bought.
    #[error("cannot return {returned} products, only {bought} were bought")]
    ReturnExceedsPurchase { returned: usize, bought: usize },

    /// The configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
