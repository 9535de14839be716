//! Service layer: pure helpers between the CLI and the store client.
//!
//! ## Service map
//! - `query.rs` — `key==value` token parsing into the search filter map.
//! - `output.rs` — JSON/text output helpers for records and envelopes.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects (printing) stay explicit and localized.
//! - Keep command handlers thin; delegate here.

pub mod output;
pub mod query;
