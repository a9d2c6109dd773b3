mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{count_places, create_request, numbered_ids, ScriptedLookup};
use rusqlite::Connection;
use travel_core::db::open_db_in_memory;
use travel_core::{
    PlacePatch, PlaceRequest, PlaceService, Project, ProjectService, ServiceError,
    SqlitePlaceRepository, SqliteProjectRepository,
};

fn seed_project(conn: &Connection, name: &str, external_ids: &[&str]) -> Project {
    let lookup = ScriptedLookup::new();
    let projects = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap(), &lookup);
    projects
        .create_project(&create_request(name, external_ids))
        .unwrap()
}

fn visit(visited: bool) -> PlacePatch {
    PlacePatch {
        notes: None,
        visited: Some(visited),
    }
}

#[test]
fn add_place_appends_resolved_place() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Trip", &["27992"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let place = places
        .add_place(project.id, &PlaceRequest::new("28560").with_notes("after lunch"))
        .unwrap();

    assert_eq!(place.project_id, project.id);
    assert_eq!(place.external_id, "28560");
    assert_eq!(place.title.as_deref(), Some("Artwork 28560"));
    assert_eq!(place.notes.as_deref(), Some("after lunch"));
    assert!(!place.visited);
    assert!(place.visited_at.is_none());
    assert_eq!(lookup.calls(), vec!["28560"]);
    assert_eq!(count_places(&conn, project.id), 2);
}

#[test]
fn eleventh_place_conflicts_without_lookup() {
    let conn = open_db_in_memory().unwrap();
    let ids = numbered_ids(10);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let project = seed_project(&conn, "Full", &ids);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let err = places
        .add_place(project.id, &PlaceRequest::new("99999"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref m) if m == "Project already has 10 places"));
    assert_eq!(lookup.call_count(), 0);
    assert_eq!(count_places(&conn, project.id), 10);
}

#[test]
fn duplicate_add_conflicts_without_lookup() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Dup", &["27992"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let err = places
        .add_place(project.id, &PlaceRequest::new("27992"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref m) if m == "Place already exists in this project"));
    assert_eq!(lookup.call_count(), 0);
}

#[test]
fn same_external_id_is_allowed_in_another_project() {
    let conn = open_db_in_memory().unwrap();
    let _first = seed_project(&conn, "First", &["27992"]);
    let second = seed_project(&conn, "Second", &["28560"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let place = places
        .add_place(second.id, &PlaceRequest::new("27992"))
        .unwrap();
    assert_eq!(place.project_id, second.id);
}

#[test]
fn catalog_miss_reports_not_found_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Miss", &["27992"]);
    let lookup = ScriptedLookup::new().missing("0");
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let err = places
        .add_place(project.id, &PlaceRequest::new("0"))
        .unwrap_err();
    match err {
        ServiceError::NotFound(message) => assert_eq!(
            message,
            "Place with external_id '0' not found in ArtIC API. Please check the ID is valid."
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_places(&conn, project.id), 1);
}

#[test]
fn add_to_missing_project_is_not_found_without_lookup() {
    let conn = open_db_in_memory().unwrap();
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let err = places
        .add_place(4_242, &PlaceRequest::new("27992"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Project not found"));
    assert_eq!(lookup.call_count(), 0);
}

#[test]
fn place_of_another_project_reads_as_missing() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_project(&conn, "First", &["27992"]);
    let second = seed_project(&conn, "Second", &["28560"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let foreign_id = first.places[0].id;
    assert!(matches!(
        places.get_place(second.id, foreign_id),
        Err(ServiceError::NotFound(ref m)) if m == "Place not found"
    ));
    assert!(matches!(
        places.update_place(second.id, foreign_id, &visit(true)),
        Err(ServiceError::NotFound(_))
    ));
    assert!(!places.get_place(first.id, foreign_id).unwrap().visited);
}

#[test]
fn list_places_is_newest_first_and_limited() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "List", &["1", "2", "3"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let listed = places.list_places(project.id, None, None).unwrap();
    let external: Vec<&str> = listed.iter().map(|p| p.external_id.as_str()).collect();
    assert_eq!(external, vec!["3", "2", "1"]);

    let page = places.list_places(project.id, Some(2), Some(1)).unwrap();
    let external: Vec<&str> = page.iter().map(|p| p.external_id.as_str()).collect();
    assert_eq!(external, vec!["2", "1"]);

    assert!(matches!(
        places.list_places(7_777, None, None),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn notes_only_patch_keeps_visit_state() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Notes", &["27992"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);
    let place_id = project.places[0].id;

    let updated = places
        .update_place(
            project.id,
            place_id,
            &PlacePatch {
                notes: Some("bring sketchbook".to_string()),
                visited: None,
            },
        )
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("bring sketchbook"));
    assert!(!updated.visited);
    assert!(updated.visited_at.is_none());
}

#[test]
fn visiting_stamps_time_and_unvisiting_clears_it() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Stamp", &["27992"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);
    let place_id = project.places[0].id;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();

    let visited = places
        .update_place_at(project.id, place_id, &visit(true), now)
        .unwrap();
    assert!(visited.visited);
    assert_eq!(visited.visited_at, Some(now));

    let cleared = places
        .update_place_at(project.id, place_id, &visit(false), now + Duration::hours(1))
        .unwrap();
    assert!(!cleared.visited);
    assert!(cleared.visited_at.is_none());
}

#[test]
fn repeated_visit_keeps_first_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Again", &["27992"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);
    let place_id = project.places[0].id;
    let first = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();

    places
        .update_place_at(project.id, place_id, &visit(true), first)
        .unwrap();
    let again = places
        .update_place_at(project.id, place_id, &visit(true), first + Duration::days(2))
        .unwrap();
    assert_eq!(again.visited_at, Some(first));
}

#[test]
fn completion_follows_visits_and_new_places() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Flip", &["27992"]);
    let lookup = ScriptedLookup::new();
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap(), &lookup);
    let place_id = project.places[0].id;

    places
        .update_place(project.id, place_id, &visit(true))
        .unwrap();
    assert!(projects.get_project(project.id).unwrap().completed);

    places
        .update_place(project.id, place_id, &visit(false))
        .unwrap();
    assert!(!projects.get_project(project.id).unwrap().completed);

    places
        .update_place(project.id, place_id, &visit(true))
        .unwrap();
    assert!(projects.get_project(project.id).unwrap().completed);

    places
        .add_place(project.id, &PlaceRequest::new("28560"))
        .unwrap();
    let reloaded = projects.get_project(project.id).unwrap();
    assert!(!reloaded.completed);
    assert_eq!(reloaded.places.len(), 2);
    assert_eq!(
        projects.list_projects(None, None).unwrap()[0].completed,
        reloaded.completed
    );
}

#[test]
fn long_external_id_reaches_catalog_on_add() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Long", &["27992"]);
    let long_id = "a".repeat(65);
    let lookup = ScriptedLookup::new().missing(&long_id);
    let places = PlaceService::new(SqlitePlaceRepository::try_new(&conn).unwrap(), &lookup);

    let err = places
        .add_place(project.id, &PlaceRequest::new(long_id.as_str()))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref m) if m.contains("not found in ArtIC API")));
    assert_eq!(lookup.call_count(), 1);
    assert_eq!(count_places(&conn, project.id), 1);
}
