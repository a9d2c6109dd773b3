//! Transport-neutral use-case API over `travel_core`.

pub mod api;

pub use api::{health, status_for, ApiResponse, ApiSetupError, TravelApi};
