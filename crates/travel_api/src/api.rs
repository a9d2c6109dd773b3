//! Use-case API for the travel planner.
//!
//! # Responsibility
//! - Expose one function per project/place operation with HTTP-style status
//!   codes, so any transport (HTTP mount, CLI) can forward them verbatim.
//! - Enforce the shared-secret credential before touching storage.
//! - Map `ServiceError` classes onto 422 / 409 / 404 / 500.
//!
//! # Invariants
//! - Functions never panic; every failure is an `ApiResponse` with `detail`.
//! - Error details never carry storage internals.
//! - `health` needs no credential.

use log::warn;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use travel_core::db::{open_db, DbError};
use travel_core::{
    AppConfig, ArticClient, ArtworkLookup, CreateProjectRequest, LookupSetupError, Place,
    PlaceId, PlacePatch, PlaceRequest, PlaceService, Project, ProjectId, ProjectPatch,
    ProjectService, ProjectSummary, ServiceError, SqlitePlaceRepository, SqliteProjectRepository,
};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_UNPROCESSABLE: u16 = 422;
pub const STATUS_INTERNAL: u16 = 500;

pub const MISSING_API_KEY: &str = "Missing API Key. Please provide X-API-Key header.";
pub const INVALID_API_KEY: &str = "Invalid API Key";

/// Response envelope: a status code plus either a body or an error detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: Option<T>,
    pub detail: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(body: T) -> Self {
        Self::with_body(STATUS_OK, body)
    }

    fn created(body: T) -> Self {
        Self::with_body(STATUS_CREATED, body)
    }

    fn with_body(status: u16, body: T) -> Self {
        Self {
            status,
            body: Some(body),
            detail: None,
        }
    }

    fn no_content() -> Self {
        Self {
            status: STATUS_NO_CONTENT,
            body: None,
            detail: None,
        }
    }

    fn failure(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: None,
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Wire payload: the body, `{"detail": ...}` on failure, `null` for 204.
    pub fn to_json(&self) -> Value {
        if let Some(detail) = self.detail.as_ref() {
            return json!({ "detail": detail });
        }
        match self.body.as_ref() {
            Some(body) => serde_json::to_value(body)
                .unwrap_or_else(|err| json!({ "detail": format!("serialization failed: {err}") })),
            None => Value::Null,
        }
    }
}

impl<T> From<ServiceError> for ApiResponse<T> {
    fn from(value: ServiceError) -> Self {
        Self::failure(status_for(&value), value.message())
    }
}

/// Status code for a service error class.
pub fn status_for(err: &ServiceError) -> u16 {
    match err {
        ServiceError::Validation(_) => STATUS_UNPROCESSABLE,
        ServiceError::Conflict(_) => STATUS_CONFLICT,
        ServiceError::NotFound(_) => STATUS_NOT_FOUND,
        ServiceError::Repo(_) => STATUS_INTERNAL,
    }
}

/// Liveness probe. Needs no credential.
pub fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({ "status": "ok" }))
}

/// Failures while wiring the API from configuration.
#[derive(Debug)]
pub enum ApiSetupError {
    Db(DbError),
    Lookup(LookupSetupError),
}

impl Display for ApiSetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database setup failed: {err}"),
            Self::Lookup(err) => write!(f, "catalog client setup failed: {err}"),
        }
    }
}

impl Error for ApiSetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Lookup(err) => Some(err),
        }
    }
}

impl From<DbError> for ApiSetupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<LookupSetupError> for ApiSetupError {
    fn from(value: LookupSetupError) -> Self {
        Self::Lookup(value)
    }
}

/// Project/place API bound to one connection, one catalog lookup, and one
/// shared secret.
pub struct TravelApi<L: ArtworkLookup> {
    conn: Connection,
    lookup: L,
    api_key: String,
}

impl TravelApi<ArticClient> {
    /// Opens the configured database and builds the HTTP catalog client.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiSetupError> {
        let conn = open_db(&config.database_path)?;
        let lookup = ArticClient::from_config(config)?;
        Ok(Self::new(conn, lookup, config.api_key.clone()))
    }
}

impl<L: ArtworkLookup> TravelApi<L> {
    pub fn new(conn: Connection, lookup: L, api_key: impl Into<String>) -> Self {
        Self {
            conn,
            lookup,
            api_key: api_key.into(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn create_project(
        &self,
        api_key: Option<&str>,
        request: &CreateProjectRequest,
    ) -> ApiResponse<Project> {
        self.guarded(api_key, |api| {
            api.with_projects(|service| service.create_project(request))
                .map_or_else(ApiResponse::from, ApiResponse::created)
        })
    }

    /// Lists projects newest first; `limit` defaults to 20 and caps at 100.
    pub fn list_projects(
        &self,
        api_key: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ApiResponse<Vec<ProjectSummary>> {
        self.guarded(api_key, |api| {
            api.with_projects(|service| service.list_projects(limit, offset))
                .map_or_else(ApiResponse::from, ApiResponse::ok)
        })
    }

    pub fn get_project(&self, api_key: Option<&str>, id: ProjectId) -> ApiResponse<Project> {
        self.guarded(api_key, |api| {
            api.with_projects(|service| service.get_project(id))
                .map_or_else(ApiResponse::from, ApiResponse::ok)
        })
    }

    pub fn update_project(
        &self,
        api_key: Option<&str>,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> ApiResponse<Project> {
        self.guarded(api_key, |api| {
            api.with_projects(|service| service.update_project(id, patch))
                .map_or_else(ApiResponse::from, ApiResponse::ok)
        })
    }

    /// Deletes a project with all places. 409 while any place is visited.
    pub fn delete_project(&self, api_key: Option<&str>, id: ProjectId) -> ApiResponse<()> {
        self.guarded(api_key, |api| {
            api.with_projects(|service| service.delete_project(id))
                .map_or_else(ApiResponse::from, |()| ApiResponse::no_content())
        })
    }

    pub fn add_place(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
        request: &PlaceRequest,
    ) -> ApiResponse<Place> {
        self.guarded(api_key, |api| {
            api.with_places(|service| service.add_place(project_id, request))
                .map_or_else(ApiResponse::from, ApiResponse::created)
        })
    }

    /// Lists places newest first; `limit` defaults to 50 and caps at 100.
    pub fn list_places(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ApiResponse<Vec<Place>> {
        self.guarded(api_key, |api| {
            api.with_places(|service| service.list_places(project_id, limit, offset))
                .map_or_else(ApiResponse::from, ApiResponse::ok)
        })
    }

    pub fn get_place(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
        place_id: PlaceId,
    ) -> ApiResponse<Place> {
        self.guarded(api_key, |api| {
            api.with_places(|service| service.get_place(project_id, place_id))
                .map_or_else(ApiResponse::from, ApiResponse::ok)
        })
    }

    pub fn update_place(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
        place_id: PlaceId,
        patch: &PlacePatch,
    ) -> ApiResponse<Place> {
        self.guarded(api_key, |api| {
            api.with_places(|service| service.update_place(project_id, place_id, patch))
                .map_or_else(ApiResponse::from, ApiResponse::ok)
        })
    }

    fn guarded<T>(
        &self,
        api_key: Option<&str>,
        f: impl FnOnce(&Self) -> ApiResponse<T>,
    ) -> ApiResponse<T> {
        match self.check_api_key(api_key) {
            Ok(()) => f(self),
            Err(response) => response,
        }
    }

    fn check_api_key<T>(&self, api_key: Option<&str>) -> Result<(), ApiResponse<T>> {
        match api_key {
            None | Some("") => {
                warn!("event=auth module=api status=rejected reason=missing_key");
                Err(ApiResponse::failure(STATUS_UNAUTHORIZED, MISSING_API_KEY))
            }
            Some(presented) if presented != self.api_key => {
                warn!("event=auth module=api status=rejected reason=invalid_key");
                Err(ApiResponse::failure(STATUS_FORBIDDEN, INVALID_API_KEY))
            }
            Some(_) => Ok(()),
        }
    }

    fn with_projects<T>(
        &self,
        f: impl FnOnce(&ProjectService<SqliteProjectRepository<'_>, &L>) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let repo = SqliteProjectRepository::try_new(&self.conn)?;
        let service = ProjectService::new(repo, &self.lookup);
        f(&service)
    }

    fn with_places<T>(
        &self,
        f: impl FnOnce(&PlaceService<SqlitePlaceRepository<'_>, &L>) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let repo = SqlitePlaceRepository::try_new(&self.conn)?;
        let service = PlaceService::new(repo, &self.lookup);
        f(&service)
    }
}
