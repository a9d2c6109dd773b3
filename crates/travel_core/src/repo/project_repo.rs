//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the project aggregate (project row + owned places) atomically.
//! - Provide paged project listing ordered newest first.
//!
//! # Invariants
//! - `create_project` commits the project and all its places or nothing.
//! - `delete_project` re-checks the visited guard inside its transaction and
//!   removes places before the project row, so no orphan is ever observable.

use super::rows::{
    date_to_db, ensure_connection_ready, ensure_project_exists, load_places,
    load_project, parse_project_row, refresh_completed, PROJECT_SELECT_SQL,
};
use super::{ListQuery, RepoError, RepoResult};
use crate::model::place::NewPlace;
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch, ProjectSummary};
use crate::rules;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for project aggregate operations.
pub trait ProjectRepository {
    /// Inserts a project together with its initial places.
    fn create_project(&self, project: &NewProject, places: &[NewPlace]) -> RepoResult<Project>;
    /// Loads one project with places, or `None` when absent.
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists projects ordered by id descending.
    fn list_projects(&self, query: &ListQuery) -> RepoResult<Vec<ProjectSummary>>;
    /// Applies a partial update and returns the refreshed aggregate.
    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project>;
    /// Deletes a project and its places unless a place is visited.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject, places: &[NewPlace]) -> RepoResult<Project> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO projects (name, description, start_date, completed)
             VALUES (?1, ?2, ?3, 0);",
            params![
                project.name.as_str(),
                project.description.as_deref(),
                project.start_date.map(date_to_db),
            ],
        )?;
        let project_id = tx.last_insert_rowid();

        for place in places {
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
        }
        refresh_completed(&tx, project_id)?;

        let created = load_project(&tx, project_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("project {project_id} missing after insert"))
        })?;
        tx.commit()?;
        Ok(created)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        load_project(self.conn, id)
    }

    fn list_projects(&self, query: &ListQuery) -> RepoResult<Vec<ProjectSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY id DESC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![i64::from(query.limit), i64::from(query.offset)])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE projects
             SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                start_date = COALESCE(?4, start_date),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                patch.name.as_deref(),
                patch.description.as_deref(),
                patch.start_date.map(date_to_db),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(id));
        }

        let updated = load_project(&tx, id)?.ok_or(RepoError::ProjectNotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, id)?;

        let places = load_places(&tx, id)?;
        rules::check_can_delete(&places)?;

        tx.execute("DELETE FROM project_places WHERE project_id = ?1;", [id])?;
        tx.execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }
}
