//! Project domain model.
//!
//! # Responsibility
//! - Define the project aggregate (project row + owned places).
//! - Define create/update shapes used by services and repositories.
//!
//! # Invariants
//! - `completed` mirrors `rules::is_completed(&places)` after every mutation.
//! - `name` is 1..=200 characters.

use super::place::{Place, PlaceRequest};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned project identifier. Higher ids are newer.
pub type ProjectId = i64;

/// Upper bound on project name length, in characters.
pub const PROJECT_NAME_MAX_CHARS: usize = 200;

/// Project aggregate with its owned places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub completed: bool,
    /// Owned places in insertion order.
    pub places: Vec<Place>,
}

/// List-view projection of a project (no places).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub completed: bool,
}

/// Caller request to create a project together with its initial places.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub places: Vec<PlaceRequest>,
}

/// Project row fields ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
}

/// Partial update for project fields. `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.start_date.is_none()
    }
}
