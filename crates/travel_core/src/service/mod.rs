//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation -> catalog lookup -> persistence.
//! - Translate repository and rule failures into the three caller-facing
//!   error classes (validation, conflict, not found).
//!
//! # Invariants
//! - No catalog lookup runs before the request passed every local check.
//! - No catalog lookup runs inside a database transaction.
//! - A failed operation leaves storage untouched.

use crate::logging::sanitize_message;
use crate::lookup::{ArtworkLookup, LookupOutcome};
use crate::model::place::{NewPlace, PlaceRequest};
use crate::repo::RepoError;
use crate::rules::RuleViolation;
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod place_service;
pub mod project_service;

pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const PLACE_NOT_FOUND: &str = "Place not found";

/// Caller-facing service error.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or out-of-range input.
    Validation(String),
    /// Request conflicts with current state (duplicates, ceiling, guard).
    Conflict(String),
    /// Unknown project/place, or catalog miss.
    NotFound(String),
    /// Storage failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Caller-facing message, without storage internals.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Conflict(message) | Self::NotFound(message) => {
                message.clone()
            }
            Self::Repo(_) => "Internal storage error".to_string(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::Repo(_) => "storage",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) | Self::Conflict(message) | Self::NotFound(message) => {
                write!(f, "{message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RuleViolation> for ServiceError {
    fn from(value: RuleViolation) -> Self {
        if value.is_validation() {
            Self::Validation(value.to_string())
        } else {
            Self::Conflict(value.to_string())
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectNotFound(_) => Self::NotFound(PROJECT_NOT_FOUND.to_string()),
            RepoError::PlaceNotFound { .. } => Self::NotFound(PLACE_NOT_FOUND.to_string()),
            RepoError::Rule(violation) => violation.into(),
            other => Self::Repo(other),
        }
    }
}

pub(crate) fn validate_external_id(external_id: &str) -> Result<(), ServiceError> {
    if external_id.is_empty() {
        return Err(ServiceError::Validation(
            "external_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Looks up one requested place and turns a hit into a persistable record.
pub(crate) fn resolve_place<L: ArtworkLookup>(
    lookup: &L,
    request: &PlaceRequest,
) -> Result<NewPlace, ServiceError> {
    match lookup.lookup(request.external_id.as_str()) {
        LookupOutcome::Found(artwork) => Ok(NewPlace {
            external_id: request.external_id.clone(),
            title: artwork.title,
            notes: request.notes.clone(),
        }),
        LookupOutcome::NotFound => Err(ServiceError::NotFound(format!(
            "Place with external_id '{}' not found in ArtIC API. Please check the ID is valid.",
            request.external_id
        ))),
    }
}

pub(crate) fn log_rejection(event: &'static str, err: &ServiceError) {
    match err {
        ServiceError::Repo(inner) => error!(
            "event={} module=service status=error error_code={} error={}",
            event,
            err.code(),
            sanitize_message(&inner.to_string(), 200)
        ),
        _ => warn!(
            "event={} module=service status=rejected error_code={} error={}",
            event,
            err.code(),
            err.message()
        ),
    }
}
