//! Place domain model.
//!
//! # Responsibility
//! - Define the persisted place record and its pre-persistence shapes.
//! - Own the visited-state transition rules.
//!
//! # Invariants
//! - `visited_at` is `Some` only while `visited` is `true`.
//! - `visited_at` changes only on an actual `visited` transition.
//! - `title` is fixed at creation time from the catalog lookup.

use super::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned place identifier.
pub type PlaceId = i64;

/// One catalog artwork attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub project_id: ProjectId,
    /// Catalog identifier, opaque and case-sensitive.
    pub external_id: String,
    /// Artwork title as reported by the catalog (may be absent).
    pub title: Option<String>,
    pub notes: Option<String>,
    pub visited: bool,
    pub visited_at: Option<DateTime<Utc>>,
}

impl Place {
    /// Applies a visited flag change.
    ///
    /// Setting `true` on an unvisited place stamps `now`; setting `false`
    /// clears the stamp. Re-applying the current value is a no-op so repeated
    /// patches stay idempotent.
    pub fn set_visited(&mut self, visited: bool, now: DateTime<Utc>) {
        if self.visited == visited {
            return;
        }
        self.visited = visited;
        self.visited_at = visited.then_some(now);
    }

    /// Applies a partial update. Omitted fields are left unchanged.
    pub fn apply_patch(&mut self, patch: &PlacePatch, now: DateTime<Utc>) {
        if let Some(notes) = patch.notes.as_ref() {
            self.notes = Some(notes.clone());
        }
        if let Some(visited) = patch.visited {
            self.set_visited(visited, now);
        }
    }
}

/// Caller request to attach one catalog artwork.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceRequest {
    pub external_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PlaceRequest {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A place that passed catalog lookup and is ready to persist.
///
/// Always starts unvisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlace {
    pub external_id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for `notes` and `visited`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacePatch {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub visited: Option<bool>,
}
