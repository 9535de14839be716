//! Shared data model layer (structs/aliases only).
//!
//! ## Purpose
//! - Keep wire/output types in one place.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — record bag, page envelope, output envelopes.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Changes here can affect `--json` outputs and integration contracts.
//! Keep schema-impacting changes synchronized with `docs/contracts/*`.

pub mod models;
