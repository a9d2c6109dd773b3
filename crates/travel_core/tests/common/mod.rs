#![allow(dead_code)]

use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashSet;
use travel_core::{
    ArtworkLookup, ArtworkMetadata, CreateProjectRequest, LookupOutcome, PlaceRequest, ProjectId,
};

/// Catalog double: every id is found unless marked missing. Records calls.
#[derive(Default)]
pub struct ScriptedLookup {
    missing: HashSet<String>,
    untitled: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing(mut self, external_id: &str) -> Self {
        self.missing.insert(external_id.to_string());
        self
    }

    pub fn untitled(mut self, external_id: &str) -> Self {
        self.untitled.insert(external_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ArtworkLookup for ScriptedLookup {
    fn lookup(&self, external_id: &str) -> LookupOutcome {
        self.calls.borrow_mut().push(external_id.to_string());
        if self.missing.contains(external_id) {
            return LookupOutcome::NotFound;
        }
        let title = if self.untitled.contains(external_id) {
            None
        } else {
            Some(format!("Artwork {external_id}"))
        };
        LookupOutcome::Found(ArtworkMetadata { title })
    }
}

pub fn create_request(name: &str, external_ids: &[&str]) -> CreateProjectRequest {
    CreateProjectRequest {
        name: name.to_string(),
        description: None,
        start_date: None,
        places: external_ids.iter().map(|id| PlaceRequest::new(*id)).collect(),
    }
}

pub fn numbered_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| (27992 + i).to_string()).collect()
}

/// Raw row count, bypassing the repositories.
pub fn count_places(conn: &Connection, project_id: ProjectId) -> usize {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM project_places WHERE project_id = ?1;",
            [project_id],
            |row| row.get(0),
        )
        .unwrap();
    usize::try_from(count).unwrap()
}
