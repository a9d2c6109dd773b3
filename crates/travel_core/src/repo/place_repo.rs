//! Place repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read places scoped to their owning project.
//! - Add one place or patch one place, recomputing project completion in the
//!   same transaction.
//!
//! # Invariants
//! - A place is only visible through its owning project id.
//! - `add_place` re-runs the cardinality/duplicate rules under an
//!   `IMMEDIATE` lock, so two writers cannot both pass the count check.

use super::rows::{
    bool_to_int, datetime_to_millis, ensure_connection_ready, ensure_project_exists, load_place,
    load_places, parse_place_row, refresh_completed, PLACE_SELECT_SQL,
};
use super::{ListQuery, RepoError, RepoResult};
use crate::model::place::{NewPlace, Place, PlaceId, PlacePatch};
use crate::model::project::ProjectId;
use crate::rules;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for place operations.
pub trait PlaceRepository {
    /// Returns the current persisted places of a project (id ascending).
    fn project_places(&self, project_id: ProjectId) -> RepoResult<Vec<Place>>;
    /// Lists places of a project ordered by id descending.
    fn list_places(&self, project_id: ProjectId, query: &ListQuery) -> RepoResult<Vec<Place>>;
    /// Loads one place if it exists and belongs to `project_id`.
    fn get_place(&self, project_id: ProjectId, place_id: PlaceId) -> RepoResult<Option<Place>>;
    /// Inserts one place after re-checking lifecycle rules.
    fn add_place(&self, project_id: ProjectId, place: &NewPlace) -> RepoResult<Place>;
    /// Applies a notes/visited patch stamped with `now`.
    fn update_place(
        &self,
        project_id: ProjectId,
        place_id: PlaceId,
        patch: &PlacePatch,
        now: DateTime<Utc>,
    ) -> RepoResult<Place>;
}

/// SQLite-backed place repository.
pub struct SqlitePlaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlaceRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PlaceRepository for SqlitePlaceRepository<'_> {
    fn project_places(&self, project_id: ProjectId) -> RepoResult<Vec<Place>> {
        ensure_project_exists(self.conn, project_id)?;
        load_places(self.conn, project_id)
    }

    fn list_places(&self, project_id: ProjectId, query: &ListQuery) -> RepoResult<Vec<Place>> {
        ensure_project_exists(self.conn, project_id)?;

        let mut stmt = self.conn.prepare(&format!(
            "{PLACE_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY id DESC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![
            project_id,
            i64::from(query.limit),
            i64::from(query.offset)
        ])?;
        let mut places = Vec::new();
        while let Some(row) = rows.next()? {
            places.push(parse_place_row(row)?);
        }
        Ok(places)
    }

    fn get_place(&self, project_id: ProjectId, place_id: PlaceId) -> RepoResult<Option<Place>> {
        load_place(self.conn, project_id, place_id)
    }

    fn add_place(&self, project_id: ProjectId, place: &NewPlace) -> RepoResult<Place> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, project_id)?;

        let existing = load_places(&tx, project_id)?;
        rules::check_can_add(&existing, place.external_id.as_str())?;

        tx.execute(
            "INSERT INTO project_places (project_id, external_id, title, notes, visited)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                project_id,
                place.external_id.as_str(),
                place.title.as_deref(),
                place.notes.as_deref(),
            ],
        )?;
        let place_id = tx.last_insert_rowid();
        refresh_completed(&tx, project_id)?;

        let created = load_place(&tx, project_id, place_id)?.ok_or(RepoError::PlaceNotFound {
            project_id,
            place_id,
        })?;
        tx.commit()?;
        Ok(created)
    }

    fn update_place(
        &self,
        project_id: ProjectId,
        place_id: PlaceId,
        patch: &PlacePatch,
        now: DateTime<Utc>,
    ) -> RepoResult<Place> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, project_id)?;

        let mut place =
            load_place(&tx, project_id, place_id)?.ok_or(RepoError::PlaceNotFound {
                project_id,
                place_id,
            })?;
        place.apply_patch(patch, now);

        tx.execute(
            "UPDATE project_places
             SET
                notes = ?3,
                visited = ?4,
                visited_at = ?5
             WHERE id = ?1
               AND project_id = ?2;",
            params![
                place_id,
                project_id,
                place.notes.as_deref(),
                bool_to_int(place.visited),
                place.visited_at.map(datetime_to_millis),
            ],
        )?;
        refresh_completed(&tx, project_id)?;

        let updated = load_place(&tx, project_id, place_id)?.ok_or(RepoError::PlaceNotFound {
            project_id,
            place_id,
        })?;
        tx.commit()?;
        Ok(updated)
    }
}
