// Incident domain types
//
// These types represent the Incident entity and its fixed type set.
// Used by the storage layer, the services and the HTTP API.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::IncidentError;

/// Incident category.
/// - `structure`: building or structure fire
/// - `vehicle`: vehicle fire or collision
/// - `wildfire`: vegetation or forest fire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum IncidentType {
    Structure,
    Vehicle,
    Wildfire,
}

impl IncidentType {
    /// All accepted incident types, in display order.
    pub const ALL: [IncidentType; 3] = [
        IncidentType::Structure,
        IncidentType::Vehicle,
        IncidentType::Wildfire,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Structure => "structure",
            IncidentType::Vehicle => "vehicle",
            IncidentType::Wildfire => "wildfire",
        }
    }
}

impl std::fmt::Display for IncidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a type name case-insensitively ("STRUCTURE" → `Structure`).
impl FromStr for IncidentType {
    type Err = IncidentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        IncidentType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| IncidentError::InvalidIncidentType(s.to_string()))
    }
}

/// A reported incident. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Incident {
    /// Opaque unique identifier.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub incident_type: IncidentType,
    /// Free-text location, not validated.
    pub location: Option<String>,
    /// Public path of the attached image (`/uploads/<filename>`).
    pub image_url: Option<String>,
    /// Creation time, ISO 8601 with millisecond precision.
    #[serde(with = "timestamp")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: DateTime<Utc>,
}

impl Incident {
    /// Build a new incident from validated input, assigning id and timestamp.
    pub fn new(input: NewIncident) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: input.title,
            description: non_empty(input.description),
            incident_type: input.incident_type,
            location: non_empty(input.location),
            image_url: non_empty(input.image_url),
            created_at: now(),
        }
    }
}

/// Validated input for creating an incident
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub title: String,
    pub description: Option<String>,
    pub incident_type: IncidentType,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

/// Current time truncated to milliseconds, so the in-memory value matches
/// what the mirror file stores.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Serde adapter writing timestamps as `2024-05-01T12:00:00.123Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> NewIncident {
        NewIncident {
            title: "Kitchen fire".to_string(),
            description: Some("Smoke from second floor".to_string()),
            incident_type: IncidentType::Structure,
            location: None,
            image_url: None,
        }
    }

    #[test]
    fn test_incident_type_parse_is_case_insensitive() {
        assert_eq!(
            "STRUCTURE".parse::<IncidentType>().unwrap(),
            IncidentType::Structure
        );
        assert_eq!(
            "Vehicle".parse::<IncidentType>().unwrap(),
            IncidentType::Vehicle
        );
        assert_eq!(
            "wildfire".parse::<IncidentType>().unwrap(),
            IncidentType::Wildfire
        );
    }

    #[test]
    fn test_incident_type_rejects_unknown() {
        let err = "earthquake".parse::<IncidentType>().unwrap_err();
        assert!(matches!(err, IncidentError::InvalidIncidentType(ref s) if s == "earthquake"));
        assert!("".parse::<IncidentType>().is_err());
    }

    #[test]
    fn test_incident_type_serializes_lowercase() {
        let json = serde_json::to_string(&IncidentType::Wildfire).unwrap();
        assert_eq!(json, "\"wildfire\"");
    }

    #[test]
    fn test_new_incident_generates_distinct_ids() {
        let a = Incident::new(sample_input());
        let b = Incident::new(sample_input());
        assert_ne!(a.id, b.id);
        assert!(b.created_at >= a.created_at);
    }

    #[test]
    fn test_new_incident_drops_empty_optionals() {
        let mut input = sample_input();
        input.description = Some(String::new());
        input.location = Some(String::new());
        let incident = Incident::new(input);
        assert_eq!(incident.description, None);
        assert_eq!(incident.location, None);
        assert_eq!(incident.image_url, None);
    }

    #[test]
    fn test_created_at_wire_format() {
        let incident = Incident::new(sample_input());
        let value = serde_json::to_value(&incident).unwrap();
        let created_at = value["created_at"].as_str().unwrap();
        // 2024-05-01T12:00:00.123Z
        assert_eq!(created_at.len(), 24);
        assert!(created_at.ends_with('Z'));
        assert_eq!(value["description"], "Smoke from second floor");
        assert!(value["location"].is_null());
        assert!(value["image_url"].is_null());
    }

    #[test]
    fn test_deserializes_existing_record() {
        let raw = r#"{
            "id": "V1StGXR8_Z5jdHi6B-myT",
            "title": "Car on fire",
            "description": null,
            "incident_type": "vehicle",
            "location": "Route 5",
            "image_url": "/uploads/1714564800000-abc.jpg",
            "created_at": "2024-05-01T12:00:00.000Z"
        }"#;
        let incident: Incident = serde_json::from_str(raw).unwrap();
        assert_eq!(incident.id, "V1StGXR8_Z5jdHi6B-myT");
        assert_eq!(incident.incident_type, IncidentType::Vehicle);
        assert_eq!(incident.location.as_deref(), Some("Route 5"));

        let back = serde_json::to_value(&incident).unwrap();
        assert_eq!(back["created_at"], "2024-05-01T12:00:00.000Z");
    }
}
