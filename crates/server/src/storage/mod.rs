// Storage layer for the Firewatch server
// Decision: JSON mirror file in production, in-memory store (firewatch-core) for tests
//
// - JsonFileIncidentStore: implements IncidentStore over a flat JSON array file

pub mod json_file;

pub use json_file::JsonFileIncidentStore;

/// File name of the incident mirror inside the data directory
pub const INCIDENTS_FILE_NAME: &str = "incidents.json";
