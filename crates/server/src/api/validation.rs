// Input validation for incident creation
//
// Raw form fields are collected into IncidentForm and converted into a typed
// NewIncident. Error messages are part of the public API.

use super::common::{ApiError, ErrorResponse};
use axum::http::StatusCode;
use axum::Json;
use firewatch_core::{IncidentType, NewIncident};
use serde_json::Value;
use utoipa::ToSchema;

pub const MISSING_REQUIRED_MESSAGE: &str = "title and incident_type are required";
pub const INVALID_TYPE_MESSAGE: &str = "invalid incident_type";

/// Text fields of an incident submission, as received.
#[derive(Debug, Clone, Default, ToSchema)]
pub struct IncidentForm {
    /// Short summary (required)
    #[schema(example = "Car fire on Route 5")]
    pub title: Option<String>,
    pub description: Option<String>,
    /// One of structure, vehicle, wildfire (case-insensitive, required)
    #[schema(example = "vehicle")]
    pub incident_type: Option<String>,
    /// Free-text location
    pub location: Option<String>,
}

/// Validation failure for an incident submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingRequired,
    InvalidIncidentType,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::MissingRequired => MISSING_REQUIRED_MESSAGE,
            ValidationError::InvalidIncidentType => INVALID_TYPE_MESSAGE,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(err.message())),
        )
    }
}

impl IncidentForm {
    /// Collect fields from a JSON body. Scalars are stringified (`5` → `"5"`),
    /// nulls count as absent, and a body that is not an object yields an
    /// empty form.
    pub fn from_json(body: Value) -> Result<Self, String> {
        let mut form = Self::default();
        let Value::Object(fields) = body else {
            return Ok(form);
        };
        for (name, value) in fields {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(format!("field {name} must be a string"));
                }
            };
            form.set_field(&name, value);
        }
        Ok(form)
    }

    /// Record a named text field; unknown fields are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "incident_type" => self.incident_type = Some(value),
            "location" => self.location = Some(value),
            _ => tracing::debug!(field = name, "Ignoring unknown form field"),
        }
    }

    /// Check required fields and normalize the incident type.
    /// The returned input has no image; the caller attaches it.
    pub fn validate(self) -> Result<NewIncident, ValidationError> {
        let title = self.title.filter(|t| !t.is_empty());
        let incident_type = self.incident_type.filter(|t| !t.is_empty());

        let (Some(title), Some(incident_type)) = (title, incident_type) else {
            return Err(ValidationError::MissingRequired);
        };

        let incident_type = incident_type.parse::<IncidentType>().map_err(|_| {
            tracing::warn!(incident_type = %incident_type, "Rejected incident type");
            ValidationError::InvalidIncidentType
        })?;

        Ok(NewIncident {
            title,
            description: self.description.filter(|d| !d.is_empty()),
            incident_type,
            location: self.location.filter(|l| !l.is_empty()),
            image_url: None,
        })
    }
}
