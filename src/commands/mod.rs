//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `runtime.rs` — list/add/modify/remove against the store.
//!
//! ## Principles
//! - Match CLI inputs here, delegate the rest to `services/*` and the
//!   store client.
//! - Keep behavior and output schema stable.

pub mod runtime;

pub use runtime::handle_runtime_commands;
