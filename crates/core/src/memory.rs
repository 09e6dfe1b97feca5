// In-memory implementations for examples and testing
//
// Keeps incidents in memory only; nothing survives a restart.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::incident::{Incident, NewIncident};
use crate::traits::{sort_newest_first, IncidentStore};

// ============================================================================
// InMemoryIncidentStore - Stores incidents in memory
// ============================================================================

/// In-memory incident store
#[derive(Debug, Default, Clone)]
pub struct InMemoryIncidentStore {
    incidents: Arc<RwLock<Vec<Incident>>>,
}

impl InMemoryIncidentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored incidents
    pub async fn len(&self) -> usize {
        self.incidents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.incidents.read().await.is_empty()
    }
}

#[async_trait]
impl IncidentStore for InMemoryIncidentStore {
    async fn list(&self) -> Result<Vec<Incident>> {
        let snapshot = self.incidents.read().await.clone();
        Ok(sort_newest_first(snapshot))
    }

    async fn create(&self, input: NewIncident) -> Result<Incident> {
        let incident = Incident::new(input);
        self.incidents.write().await.push(incident.clone());
        Ok(incident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::IncidentType;

    fn input(title: &str) -> NewIncident {
        NewIncident {
            title: title.to_string(),
            description: None,
            incident_type: IncidentType::Vehicle,
            location: Some("Main St".to_string()),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = InMemoryIncidentStore::new();
        assert!(store.is_empty().await);

        let first = store.create(input("first")).await.unwrap();
        let second = store.create(input("second")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], second);
        assert_eq!(listed[1], first);
    }

    #[tokio::test]
    async fn test_list_returns_snapshot() {
        let store = InMemoryIncidentStore::new();
        store.create(input("only")).await.unwrap();

        let mut listed = store.list().await.unwrap();
        listed.clear();

        assert_eq!(store.len().await, 1);
    }
}
