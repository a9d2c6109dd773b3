//! Row mapping and shared SQL helpers for project/place tables.
//!
//! Functions take `&Connection` so they work both on plain connections and
//! inside a `Transaction` (which derefs to `Connection`).

use super::{RepoError, RepoResult};
use crate::db::migrations::latest_version;
use crate::model::place::{Place, PlaceId};
use crate::model::project::{Project, ProjectId, ProjectSummary};
use crate::rules;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    start_date,
    completed
FROM projects";

pub(crate) const PLACE_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    external_id,
    title,
    notes,
    visited,
    visited_at
FROM project_places";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn project_exists(conn: &Connection, project_id: ProjectId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
        [project_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn ensure_project_exists(conn: &Connection, project_id: ProjectId) -> RepoResult<()> {
    if project_exists(conn, project_id)? {
        Ok(())
    } else {
        Err(RepoError::ProjectNotFound(project_id))
    }
}

/// Loads one project with its places in insertion order.
pub(crate) fn load_project(conn: &Connection, project_id: ProjectId) -> RepoResult<Option<Project>> {
    let summary = conn
        .query_row(
            &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
            [project_id],
            |row| Ok(parse_project_row(row)),
        )
        .optional()?;

    match summary {
        Some(columns) => {
            let summary = columns?;
            let places = load_places(conn, project_id)?;
            Ok(Some(Project {
                id: summary.id,
                name: summary.name,
                description: summary.description,
                start_date: summary.start_date,
                completed: summary.completed,
                places,
            }))
        }
        None => Ok(None),
    }
}

/// Loads every place of a project ordered by id ascending.
pub(crate) fn load_places(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<Place>> {
    let mut stmt = conn.prepare(&format!(
        "{PLACE_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([project_id])?;
    let mut places = Vec::new();
    while let Some(row) = rows.next()? {
        places.push(parse_place_row(row)?);
    }
    Ok(places)
}

pub(crate) fn load_place(
    conn: &Connection,
    project_id: ProjectId,
    place_id: PlaceId,
) -> RepoResult<Option<Place>> {
    let mut stmt = conn.prepare(&format!(
        "{PLACE_SELECT_SQL} WHERE id = ?1 AND project_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![place_id, project_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_place_row(row)?));
    }
    Ok(None)
}

/// Recomputes and stores `projects.completed` from the persisted places.
pub(crate) fn refresh_completed(conn: &Connection, project_id: ProjectId) -> RepoResult<bool> {
    let places = load_places(conn, project_id)?;
    let completed = rules::is_completed(&places);
    conn.execute(
        "UPDATE projects
         SET
            completed = ?2,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        params![project_id, bool_to_int(completed)],
    )?;
    Ok(completed)
}

pub(crate) fn parse_project_row(row: &Row<'_>) -> RepoResult<ProjectSummary> {
    let start_date = match row.get::<_, Option<String>>("start_date")? {
        Some(value) => Some(parse_date(&value)?),
        None => None,
    };

    Ok(ProjectSummary {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date,
        completed: parse_flag(row.get("completed")?, "projects.completed")?,
    })
}

pub(crate) fn parse_place_row(row: &Row<'_>) -> RepoResult<Place> {
    let visited = parse_flag(row.get("visited")?, "project_places.visited")?;
    let visited_at = match row.get::<_, Option<i64>>("visited_at")? {
        Some(millis) => Some(millis_to_datetime(millis)?),
        None => None,
    };
    if !visited && visited_at.is_some() {
        return Err(RepoError::InvalidData(
            "project_places.visited_at is set on an unvisited place".to_string(),
        ));
    }

    Ok(Place {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        external_id: row.get("external_id")?,
        title: row.get("title")?,
        notes: row.get("notes")?,
        visited,
        visited_at,
    })
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in projects.start_date"))
    })
}

pub(crate) fn datetime_to_millis(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

fn millis_to_datetime(millis: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{millis}` in project_places.visited_at"
        ))
    })
}

fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
