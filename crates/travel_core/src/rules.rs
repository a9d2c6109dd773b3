//! Project/place lifecycle rules.
//!
//! # Responsibility
//! - Cardinality and duplicate checks for batch creation and single adds.
//! - Completion derivation and deletion eligibility.
//!
//! # Invariants
//! - Every function here is pure: no storage, no clock, no network.
//! - `external_id` comparison is exact (case-sensitive, no trimming).

use crate::model::place::{Place, PlaceRequest};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of places one project may hold.
pub const MAX_PLACES_PER_PROJECT: usize = 10;

/// Broken lifecycle rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    /// Creation batch has no places.
    EmptyBatch,
    /// Creation batch exceeds the per-project ceiling.
    BatchTooLarge { count: usize },
    /// Same `external_id` appears twice in one creation batch.
    DuplicateInBatch { external_id: String },
    /// Project already holds the maximum number of places.
    ProjectFull,
    /// Project already holds a place with this `external_id`.
    PlaceAlreadyExists { external_id: String },
    /// At least one place is visited, so the project must be kept.
    HasVisitedPlaces,
}

impl RuleViolation {
    /// Whether the violation is about request shape rather than current state.
    ///
    /// Shape violations surface as validation errors, the rest as conflicts.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyBatch | Self::BatchTooLarge { .. })
    }
}

impl Display for RuleViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "Project must have at least 1 place"),
            Self::BatchTooLarge { .. } => {
                write!(f, "Project must have 1..{MAX_PLACES_PER_PROJECT} places")
            }
            Self::DuplicateInBatch { .. } => write!(f, "Duplicate external_id in request"),
            Self::ProjectFull => {
                write!(f, "Project already has {MAX_PLACES_PER_PROJECT} places")
            }
            Self::PlaceAlreadyExists { .. } => write!(f, "Place already exists in this project"),
            Self::HasVisitedPlaces => write!(f, "Cannot delete project with visited places"),
        }
    }
}

impl Error for RuleViolation {}

/// Validates a creation batch before any catalog lookup happens.
///
/// Checks run in order: empty, too large, first duplicate in input order.
pub fn validate_batch(requests: &[PlaceRequest]) -> Result<(), RuleViolation> {
    if requests.is_empty() {
        return Err(RuleViolation::EmptyBatch);
    }
    if requests.len() > MAX_PLACES_PER_PROJECT {
        return Err(RuleViolation::BatchTooLarge {
            count: requests.len(),
        });
    }

    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        if !seen.insert(request.external_id.as_str()) {
            return Err(RuleViolation::DuplicateInBatch {
                external_id: request.external_id.clone(),
            });
        }
    }
    Ok(())
}

/// Checks whether one more place may join a project holding `existing`.
///
/// `existing` must be the persisted places read at call time.
pub fn check_can_add(existing: &[Place], external_id: &str) -> Result<(), RuleViolation> {
    if existing.len() >= MAX_PLACES_PER_PROJECT {
        return Err(RuleViolation::ProjectFull);
    }
    if existing.iter().any(|place| place.external_id == external_id) {
        return Err(RuleViolation::PlaceAlreadyExists {
            external_id: external_id.to_string(),
        });
    }
    Ok(())
}

/// A project is completed iff it has places and every one is visited.
pub fn is_completed(places: &[Place]) -> bool {
    !places.is_empty() && places.iter().all(|place| place.visited)
}

/// A project may be deleted iff none of its places is visited.
pub fn can_delete(places: &[Place]) -> bool {
    !places.iter().any(|place| place.visited)
}

/// Returns `Err(HasVisitedPlaces)` when deletion must be refused.
pub fn check_can_delete(places: &[Place]) -> Result<(), RuleViolation> {
    if can_delete(places) {
        Ok(())
    } else {
        Err(RuleViolation::HasVisitedPlaces)
    }
}
