//! # Observability & Tracing
//!
//! This module provides the tracing setup for the factory and its actors.
//!
//! ## Overview
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Every actor task runs inside an `actor` span carrying its `kind` and `id`, so log lines
//! emitted deep inside the monitor still say which actor they belong to.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`); the span fields
//! already identify the actor.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: started, finished (with the result), failed
//! - **Admissions**: production, purchases, returns and thefts with counts and stock left
//! - **Gates**: every open/close, and whether the flag actually flipped
//! - **Waits**: each time an actor goes back to sleep (`trace` level)
//! - **Caller errors**: duplicate ids, unknown ids, timeouts (`warn` level)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Admissions and lifecycle
//! RUST_LOG=info cargo run
//!
//! # Gate flips, refusals, filter decisions
//! RUST_LOG=debug cargo run
//!
//! # Every wait and wake
//! RUST_LOG=trace cargo run
//!
//! # Only the synchronization core
//! RUST_LOG=product_factory::monitor=trace cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**, a thief stealing three units:
//!
//! ```text
//! INFO actor: Actor started kind="thief" id=actor_7
//! INFO actor: Stole products thief=actor_7 requested=3 stolen=3 available=1 kind="thief" id=actor_7
//! INFO actor: Actor finished output=3 kind="thief" id=actor_7
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Span fields already name the actor
        .compact()
        .init();
}
