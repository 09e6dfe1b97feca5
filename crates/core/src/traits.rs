// Core traits for pluggable backends
//
// The HTTP layer only sees the IncidentStore trait:
// - JSON mirror file implementation for the server
// - In-memory implementation for examples and testing

use async_trait::async_trait;

use crate::error::Result;
use crate::incident::{Incident, NewIncident};

// ============================================================================
// IncidentStore - For persisting incidents
// ============================================================================

/// Trait for storing and listing incidents
///
/// Implementations own the canonical collection; callers only ever receive
/// owned snapshots.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// All incidents, newest `created_at` first
    async fn list(&self) -> Result<Vec<Incident>>;

    /// Assign id and timestamp, store, and return the created incident
    async fn create(&self, input: NewIncident) -> Result<Incident>;
}

/// Sort newest first. Incidents sharing a timestamp keep the most recently
/// inserted one first, given input in insertion order.
pub fn sort_newest_first(mut incidents: Vec<Incident>) -> Vec<Incident> {
    incidents.reverse();
    incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    incidents
}
