//! Artwork catalog lookup boundary.
//!
//! # Responsibility
//! - Define the single-call contract the core uses to validate catalog ids.
//! - Collapse every failure mode into `LookupOutcome::NotFound`.
//!
//! # Invariants
//! - Callers never see transport errors, status codes or response bodies.
//! - One call per id, no retries.

mod artic;

pub use artic::{parse_artwork_response, ArticClient, LookupSetupError};

/// Catalog metadata the core keeps from a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtworkMetadata {
    pub title: Option<String>,
}

/// Result of one catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(ArtworkMetadata),
    NotFound,
}

/// Source of artwork metadata keyed by catalog id.
pub trait ArtworkLookup {
    fn lookup(&self, external_id: &str) -> LookupOutcome;
}

impl<T: ArtworkLookup + ?Sized> ArtworkLookup for &T {
    fn lookup(&self, external_id: &str) -> LookupOutcome {
        (**self).lookup(external_id)
    }
}

impl<T: ArtworkLookup + ?Sized> ArtworkLookup for Box<T> {
    fn lookup(&self, external_id: &str) -> LookupOutcome {
        (**self).lookup(external_id)
    }
}
