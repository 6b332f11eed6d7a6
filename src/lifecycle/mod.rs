//! # Factory Lifecycle
//!
//! This module turns the synchronization core into something callers can
//! drive: it starts actor tasks, joins them by id, and sets up logging.
//!
//! ## Start / Finish
//!
//! Every actor kind follows the same two-call pattern:
//!
//! ```rust,ignore
//! factory.start_thief(3, ActorId(7))?;            // spawn, return immediately
//! let stolen = factory.finish_thief(ActorId(7)).await?; // join, fetch result, forget id
//! ```
//!
//! The [`TaskRegistry`] behind each kind owns the task handles. Finishing an
//! id that was never started (or was already finished) is a caller error and
//! is reported, never ignored.
//!
//! ## Observability & Tracing
//!
//! [`setup_tracing`] initializes a compact `tracing_subscriber` filtered by
//! `RUST_LOG`. See the [`tracing`] module for what each level shows.

pub mod factory;
pub mod registry;
pub mod tracing;

pub use factory::*;
pub use registry::*;
pub use self::tracing::*;
