// HTTP API routes
//
// This module contains all HTTP route handlers for the public API.
// Each submodule handles a specific resource type with its own AppState.

pub mod common;
pub mod incidents;
pub mod uploads;
pub mod validation;

// Re-export common types
pub use common::ErrorResponse;
