//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the project aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every multi-row write runs in one `IMMEDIATE` transaction.
//! - Writes that change places recompute `projects.completed` in the same
//!   transaction.
//! - Repository APIs return semantic errors (`*NotFound`, `Rule`) in addition
//!   to DB transport errors.

use crate::db::DbError;
use crate::model::place::PlaceId;
use crate::model::project::ProjectId;
use crate::rules::RuleViolation;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod place_repo;
pub mod project_repo;
mod rows;

/// Default page size for project listing.
pub const PROJECTS_DEFAULT_LIMIT: u32 = 20;
/// Default page size for place listing.
pub const PLACES_DEFAULT_LIMIT: u32 = 50;
/// Hard cap on any page size.
pub const LIST_LIMIT_MAX: u32 = 100;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project/place persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    ProjectNotFound(ProjectId),
    PlaceNotFound {
        project_id: ProjectId,
        place_id: PlaceId,
    },
    /// Lifecycle rule re-checked inside the write transaction failed.
    Rule(RuleViolation),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::PlaceNotFound {
                project_id,
                place_id,
            } => write!(f, "place {place_id} not found in project {project_id}"),
            Self::Rule(violation) => write!(f, "{violation}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "project repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Rule(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RuleViolation> for RepoError {
    fn from(value: RuleViolation) -> Self {
        Self::Rule(value)
    }
}

/// Pagination window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
}

impl ListQuery {
    /// Builds a window, applying `default_limit` and the global cap.
    pub fn new(limit: Option<u32>, offset: Option<u32>, default_limit: u32) -> Self {
        Self {
            limit: normalize_limit(limit, default_limit),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Resolves an optional caller limit against a default and `LIST_LIMIT_MAX`.
pub fn normalize_limit(limit: Option<u32>, default_limit: u32) -> u32 {
    limit.unwrap_or(default_limit).min(LIST_LIMIT_MAX)
}
