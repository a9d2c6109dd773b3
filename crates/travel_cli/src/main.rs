//! Command-line front end for the travel planner.
//!
//! # Responsibility
//! - Parse subcommands, load `AppConfig`, wire `TravelApi` against the
//!   configured database and catalog.
//! - Print every response as JSON with its status code.
//!
//! # Invariants
//! - Exit code is 0 only for 2xx responses.

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::info;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use travel_api::{ApiResponse, TravelApi};
use travel_core::{
    init_logging, AppConfig, ArticClient, CreateProjectRequest, PlacePatch, PlaceRequest,
    ProjectPatch,
};

#[derive(Debug, Parser)]
#[command(name = "travel", version, about = "Plan art-museum trips from the command line")]
struct Cli {
    /// TOML config file; `TRAVEL_*` environment variables override it.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Credential to present. Defaults to the configured `api_key`.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Liveness probe.
    Health,
    #[command(subcommand)]
    Project(ProjectCommand),
    #[command(subcommand)]
    Place(PlaceCommand),
}

#[derive(Debug, Subcommand)]
enum ProjectCommand {
    /// Create a project with 1..=10 catalog places.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// ISO date, e.g. 2024-05-01.
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Catalog id, optionally `ID=NOTES`. Repeat for each place.
        #[arg(long = "place", value_name = "ID[=NOTES]", value_parser = parse_place_arg)]
        places: Vec<PlaceRequest>,
    },
    List(Page),
    Get {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum PlaceCommand {
    /// Add one catalog place to an existing project.
    Add {
        project_id: i64,
        external_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        project_id: i64,
        #[command(flatten)]
        page: Page,
    },
    Get {
        project_id: i64,
        place_id: i64,
    },
    Update {
        project_id: i64,
        place_id: i64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        visited: Option<bool>,
    },
}

#[derive(Debug, Args)]
struct Page {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    offset: Option<u32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Health = cli.command {
        return print_response(&travel_api::health());
    }

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::from(2);
        }
    };
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("logging init failed: {err}");
        }
    }

    let api = match TravelApi::from_config(&config) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let api_key = cli.api_key.unwrap_or_else(|| config.api_key.clone());
    info!("event=cli_command module=cli status=start");

    run(&api, Some(api_key.as_str()), cli.command)
}

fn run(api: &TravelApi<ArticClient>, key: Option<&str>, command: Command) -> ExitCode {
    match command {
        Command::Health => print_response(&travel_api::health()),
        Command::Project(command) => run_project(api, key, command),
        Command::Place(command) => run_place(api, key, command),
    }
}

fn run_project(api: &TravelApi<ArticClient>, key: Option<&str>, command: ProjectCommand) -> ExitCode {
    match command {
        ProjectCommand::Create {
            name,
            description,
            start_date,
            places,
        } => {
            let request = CreateProjectRequest {
                name,
                description,
                start_date,
                places,
            };
            print_response(&api.create_project(key, &request))
        }
        ProjectCommand::List(page) => {
            print_response(&api.list_projects(key, page.limit, page.offset))
        }
        ProjectCommand::Get { id } => print_response(&api.get_project(key, id)),
        ProjectCommand::Update {
            id,
            name,
            description,
            start_date,
        } => {
            let patch = ProjectPatch {
                name,
                description,
                start_date,
            };
            print_response(&api.update_project(key, id, &patch))
        }
        ProjectCommand::Delete { id } => print_response(&api.delete_project(key, id)),
    }
}

fn run_place(api: &TravelApi<ArticClient>, key: Option<&str>, command: PlaceCommand) -> ExitCode {
    match command {
        PlaceCommand::Add {
            project_id,
            external_id,
            notes,
        } => {
            let request = PlaceRequest { external_id, notes };
            print_response(&api.add_place(key, project_id, &request))
        }
        PlaceCommand::List { project_id, page } => {
            print_response(&api.list_places(key, project_id, page.limit, page.offset))
        }
        PlaceCommand::Get {
            project_id,
            place_id,
        } => print_response(&api.get_place(key, project_id, place_id)),
        PlaceCommand::Update {
            project_id,
            place_id,
            notes,
            visited,
        } => {
            let patch = PlacePatch { notes, visited };
            print_response(&api.update_place(key, project_id, place_id, &patch))
        }
    }
}

fn parse_place_arg(raw: &str) -> Result<PlaceRequest, String> {
    let (external_id, notes) = match raw.split_once('=') {
        Some((id, notes)) => (id, Some(notes.to_string())),
        None => (raw, None),
    };
    if external_id.is_empty() {
        return Err("place id must not be empty".to_string());
    }
    Ok(PlaceRequest {
        external_id: external_id.to_string(),
        notes,
    })
}

fn render<T: serde::Serialize>(response: &ApiResponse<T>) -> Value {
    json!({
        "status": response.status,
        "response": response.to_json(),
    })
}

fn print_response<T: serde::Serialize>(response: &ApiResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(&render(response)) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("failed to render response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_place_arg, Cli, Command, PlaceCommand, ProjectCommand};
    use clap::Parser;

    #[test]
    fn place_arg_splits_notes() {
        let place = parse_place_arg("27992=see the Seurat").unwrap();
        assert_eq!(place.external_id, "27992");
        assert_eq!(place.notes.as_deref(), Some("see the Seurat"));

        let bare = parse_place_arg("28560").unwrap();
        assert_eq!(bare.notes, None);

        assert!(parse_place_arg("=notes").is_err());
    }

    #[test]
    fn place_arg_keeps_id_verbatim() {
        let padded = parse_place_arg(" Ab12 =notes").unwrap();
        assert_eq!(padded.external_id, " Ab12 ");

        let bare = parse_place_arg("x9 ").unwrap();
        assert_eq!(bare.external_id, "x9 ");
    }

    #[test]
    fn create_collects_repeated_places() {
        let cli = Cli::parse_from([
            "travel",
            "project",
            "create",
            "--name",
            "Chicago",
            "--start-date",
            "2024-05-01",
            "--place",
            "27992",
            "--place",
            "28560=upstairs",
        ]);
        match cli.command {
            Command::Project(ProjectCommand::Create {
                name,
                start_date,
                places,
                ..
            }) => {
                assert_eq!(name, "Chicago");
                assert_eq!(start_date.unwrap().to_string(), "2024-05-01");
                assert_eq!(places.len(), 2);
                assert_eq!(places[1].notes.as_deref(), Some("upstairs"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn place_update_takes_explicit_bool() {
        let cli = Cli::parse_from([
            "travel", "--api-key", "k", "place", "update", "1", "2", "--visited", "false",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        match cli.command {
            Command::Place(PlaceCommand::Update { visited, notes, .. }) => {
                assert_eq!(visited, Some(false));
                assert_eq!(notes, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
