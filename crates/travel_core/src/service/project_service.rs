//! Project use-case service.
//!
//! # Responsibility
//! - Create a project with its initial places (bulk path).
//! - Read, list, patch and delete projects.
//!
//! # Invariants
//! - Bulk creation validates the whole batch before the first lookup.
//! - Lookups run sequentially in input order and stop at the first miss.
//! - Nothing is persisted unless every lookup succeeded.

use super::{log_rejection, resolve_place, validate_external_id, ServiceError, PROJECT_NOT_FOUND};
use crate::lookup::ArtworkLookup;
use crate::model::project::{
    CreateProjectRequest, NewProject, Project, ProjectId, ProjectPatch, ProjectSummary,
    PROJECT_NAME_MAX_CHARS,
};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::{ListQuery, PROJECTS_DEFAULT_LIMIT};
use crate::rules;
use log::info;
use std::time::Instant;

/// Project service facade over a repository and a catalog lookup.
pub struct ProjectService<R: ProjectRepository, L: ArtworkLookup> {
    repo: R,
    lookup: L,
}

impl<R: ProjectRepository, L: ArtworkLookup> ProjectService<R, L> {
    pub fn new(repo: R, lookup: L) -> Self {
        Self { repo, lookup }
    }

    /// Creates a project together with 1..=10 catalog places.
    ///
    /// # Errors
    /// - `Validation` for a bad name, a bad external id, or an empty/oversized batch.
    /// - `Conflict` for a duplicate external id inside the batch.
    /// - `NotFound` for the first id the catalog does not know.
    pub fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, ServiceError> {
        let started_at = Instant::now();
        let result = self.create_project_inner(request);
        match &result {
            Ok(project) => info!(
                "event=project_create module=service status=ok project_id={} place_count={} duration_ms={}",
                project.id,
                project.places.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_rejection("project_create", err),
        }
        result
    }

    fn create_project_inner(&self, request: &CreateProjectRequest) -> Result<Project, ServiceError> {
        let name = validate_name(request.name.as_str())?;
        for place in &request.places {
            validate_external_id(place.external_id.as_str())?;
        }
        rules::validate_batch(&request.places)?;

        let mut places = Vec::with_capacity(request.places.len());
        for place in &request.places {
            places.push(resolve_place(&self.lookup, place)?);
        }

        let project = NewProject {
            name,
            description: request.description.clone(),
            start_date: request.start_date,
        };
        Ok(self.repo.create_project(&project, &places)?)
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Project, ServiceError> {
        self.repo
            .get_project(id)?
            .ok_or_else(|| ServiceError::NotFound(PROJECT_NOT_FOUND.to_string()))
    }

    /// Lists projects newest first. `limit` defaults to 20 and caps at 100.
    pub fn list_projects(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ProjectSummary>, ServiceError> {
        let query = ListQuery::new(limit, offset, PROJECTS_DEFAULT_LIMIT);
        Ok(self.repo.list_projects(&query)?)
    }

    /// Updates any subset of name/description/start_date.
    pub fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ServiceError> {
        let result = self.update_project_inner(id, patch);
        match &result {
            Ok(project) => info!(
                "event=project_update module=service status=ok project_id={}",
                project.id
            ),
            Err(err) => log_rejection("project_update", err),
        }
        result
    }

    fn update_project_inner(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ServiceError> {
        let mut patch = patch.clone();
        if let Some(name) = patch.name.take() {
            patch.name = Some(validate_name(name.as_str())?);
        }
        if patch.is_empty() {
            return self.get_project(id);
        }
        Ok(self.repo.update_project(id, &patch)?)
    }

    /// Deletes a project and its places unless one of them is visited.
    pub fn delete_project(&self, id: ProjectId) -> Result<(), ServiceError> {
        let result = self.repo.delete_project(id).map_err(ServiceError::from);
        match &result {
            Ok(()) => info!(
                "event=project_delete module=service status=ok project_id={}",
                id
            ),
            Err(err) => log_rejection("project_delete", err),
        }
        result
    }
}

fn validate_name(name: &str) -> Result<String, ServiceError> {
    let length = name.chars().count();
    if length == 0 || length > PROJECT_NAME_MAX_CHARS {
        return Err(ServiceError::Validation(format!(
            "name must be 1..{PROJECT_NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}
