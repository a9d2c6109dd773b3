//! Domain model for travel projects and their catalog places.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep request/patch shapes next to the records they mutate.
//!
//! # Invariants
//! - A `Place` is always owned by exactly one `Project`.
//! - `Project::completed` is derived state, never set directly by callers.

pub mod place;
pub mod project;
