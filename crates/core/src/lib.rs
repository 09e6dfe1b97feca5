// Firewatch core
//
// Domain types and storage traits shared by the server and its tests.
//
// Key design decisions:
// - Incident is create-only; there is no update or delete path
// - IncidentType is a closed enum, so an invalid type cannot be stored
// - Persistence is pluggable through the IncidentStore trait

pub mod error;
pub mod incident;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use error::{IncidentError, Result};
pub use incident::{Incident, IncidentType, NewIncident};
pub use memory::InMemoryIncidentStore;
pub use traits::IncidentStore;
