// OpenAPI specification
//
// Served at /api-doc/openapi.json and printed by the export-openapi binary.

use crate::api;
use crate::HealthResponse;
use firewatch_core::{Incident, IncidentType};
use utoipa::OpenApi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::incidents::list_incidents,
        api::incidents::create_incident,
        api::uploads::serve_upload,
        crate::health,
    ),
    components(
        schemas(
            Incident, IncidentType,
            api::incidents::CreateIncidentMultipart,
            api::validation::IncidentForm,
            api::ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "incidents", description = "Incident reporting endpoints"),
        (name = "uploads", description = "Uploaded image serving"),
        (name = "health", description = "Liveness check")
    ),
    info(
        title = "Firewatch API",
        version = "0.1.0",
        description = "API for reporting and listing incidents",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

/// Pretty-printed OpenAPI JSON
pub fn openapi_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc: serde_json::Value = serde_json::from_str(&openapi_json().unwrap()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/incidents"));
        assert!(paths.contains_key("/uploads/{filename}"));
        assert!(paths.contains_key("/health"));
        assert!(doc["paths"]["/api/incidents"]["post"].is_object());
        assert!(doc["components"]["schemas"]["Incident"].is_object());
    }
}
