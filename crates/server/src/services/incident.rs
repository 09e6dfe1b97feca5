// Incident service for business logic

use anyhow::Result;
use firewatch_core::{Incident, IncidentStore, NewIncident};
use std::sync::Arc;

pub struct IncidentService {
    store: Arc<dyn IncidentStore>,
}

impl IncidentService {
    pub fn new(store: Arc<dyn IncidentStore>) -> Self {
        Self { store }
    }

    /// All incidents, newest first
    pub async fn list(&self) -> Result<Vec<Incident>> {
        Ok(self.store.list().await?)
    }

    pub async fn create(&self, input: NewIncident) -> Result<Incident> {
        let incident = self.store.create(input).await?;
        tracing::info!(
            incident_id = %incident.id,
            incident_type = %incident.incident_type,
            has_image = incident.image_url.is_some(),
            "Incident created"
        );
        Ok(incident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewatch_core::{IncidentType, InMemoryIncidentStore};

    #[tokio::test]
    async fn test_create_then_list() {
        let service = IncidentService::new(Arc::new(InMemoryIncidentStore::new()));

        let created = service
            .create(NewIncident {
                title: "Brush fire".to_string(),
                description: None,
                incident_type: IncidentType::Wildfire,
                location: Some("North ridge".to_string()),
                image_url: None,
            })
            .await
            .unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![created]);
    }
}
