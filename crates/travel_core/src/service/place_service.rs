//! Place use-case service.
//!
//! # Responsibility
//! - Add one catalog place to an existing project (incremental path).
//! - Read places and apply notes/visited patches.
//!
//! # Invariants
//! - The 10-place ceiling and duplicate checks read persisted state at call
//!   time, before the lookup, and again inside the insert transaction.
//! - `visited_at` follows `Place::set_visited` transition rules.

use super::{
    log_rejection, resolve_place, validate_external_id, ServiceError, PLACE_NOT_FOUND,
};
use crate::lookup::ArtworkLookup;
use crate::model::place::{Place, PlaceId, PlacePatch, PlaceRequest};
use crate::model::project::ProjectId;
use crate::repo::place_repo::PlaceRepository;
use crate::repo::{ListQuery, PLACES_DEFAULT_LIMIT};
use crate::rules;
use chrono::{DateTime, Utc};
use log::info;

/// Place service facade over a repository and a catalog lookup.
pub struct PlaceService<R: PlaceRepository, L: ArtworkLookup> {
    repo: R,
    lookup: L,
}

impl<R: PlaceRepository, L: ArtworkLookup> PlaceService<R, L> {
    pub fn new(repo: R, lookup: L) -> Self {
        Self { repo, lookup }
    }

    /// Adds one place to an existing project.
    ///
    /// # Errors
    /// - `NotFound` when the project is missing or the catalog misses the id.
    /// - `Conflict` when the project is full or already holds the id.
    pub fn add_place(
        &self,
        project_id: ProjectId,
        request: &PlaceRequest,
    ) -> Result<Place, ServiceError> {
        let result = self.add_place_inner(project_id, request);
        match &result {
            Ok(place) => info!(
                "event=place_add module=service status=ok project_id={} place_id={}",
                project_id, place.id
            ),
            Err(err) => log_rejection("place_add", err),
        }
        result
    }

    fn add_place_inner(
        &self,
        project_id: ProjectId,
        request: &PlaceRequest,
    ) -> Result<Place, ServiceError> {
        validate_external_id(request.external_id.as_str())?;

        let existing = self.repo.project_places(project_id)?;
        rules::check_can_add(&existing, request.external_id.as_str())?;

        let place = resolve_place(&self.lookup, request)?;
        Ok(self.repo.add_place(project_id, &place)?)
    }

    /// Lists places of a project newest first. `limit` defaults to 50, caps at 100.
    pub fn list_places(
        &self,
        project_id: ProjectId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Place>, ServiceError> {
        let query = ListQuery::new(limit, offset, PLACES_DEFAULT_LIMIT);
        Ok(self.repo.list_places(project_id, &query)?)
    }

    /// Gets one place; a place owned by another project is reported missing.
    pub fn get_place(&self, project_id: ProjectId, place_id: PlaceId) -> Result<Place, ServiceError> {
        self.repo
            .get_place(project_id, place_id)?
            .ok_or_else(|| ServiceError::NotFound(PLACE_NOT_FOUND.to_string()))
    }

    /// Applies a notes/visited patch using the current UTC time.
    pub fn update_place(
        &self,
        project_id: ProjectId,
        place_id: PlaceId,
        patch: &PlacePatch,
    ) -> Result<Place, ServiceError> {
        self.update_place_at(project_id, place_id, patch, Utc::now())
    }

    /// Same as `update_place` with an explicit clock reading.
    pub fn update_place_at(
        &self,
        project_id: ProjectId,
        place_id: PlaceId,
        patch: &PlacePatch,
        now: DateTime<Utc>,
    ) -> Result<Place, ServiceError> {
        let result = self
            .repo
            .update_place(project_id, place_id, patch, now)
            .map_err(ServiceError::from);
        match &result {
            Ok(place) => info!(
                "event=place_update module=service status=ok project_id={} place_id={} visited={}",
                project_id, place.id, place.visited
            ),
            Err(err) => log_rejection("place_update", err),
        }
        result
    }
}
