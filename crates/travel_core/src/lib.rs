//! Core domain logic for the travel planner.
//! This crate is the single source of truth for project/place invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod repo;
pub mod rules;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use lookup::{ArticClient, ArtworkLookup, ArtworkMetadata, LookupOutcome, LookupSetupError};
pub use model::place::{NewPlace, Place, PlaceId, PlacePatch, PlaceRequest};
pub use model::project::{
    CreateProjectRequest, NewProject, Project, ProjectId, ProjectPatch, ProjectSummary,
};
pub use repo::place_repo::{PlaceRepository, SqlitePlaceRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{ListQuery, RepoError, RepoResult};
pub use rules::{RuleViolation, MAX_PLACES_PER_PROJECT};
pub use service::place_service::PlaceService;
pub use service::project_service::ProjectService;
pub use service::ServiceError;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "ok"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_ok() {
        assert_eq!(ping(), "ok");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
