// Incident HTTP routes
//
// - GET  /api/incidents - List incidents, newest first
// - POST /api/incidents - Create an incident (multipart form, optional image)
//
// Note: POST also accepts a JSON body with the same text fields (no image).
// Any other body is treated as an empty form.

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        DefaultBodyLimit, FromRequest, Multipart, Request, State,
    },
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use firewatch_core::Incident;
use std::sync::Arc;

use super::common::{bad_request, internal_error, ApiError, ErrorResponse};
use super::validation::IncidentForm;
use crate::services::upload::{IMAGE_FIELD, MAX_UPLOAD_BYTES};
use crate::services::{IncidentService, PendingUpload, UploadError, UploadService};

/// Request body cap: one image plus room for the text fields.
pub const MAX_REQUEST_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// App state for incident routes
#[derive(Clone)]
pub struct AppState {
    pub incident_service: Arc<IncidentService>,
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    pub fn new(incident_service: Arc<IncidentService>, upload_service: Arc<UploadService>) -> Self {
        Self {
            incident_service,
            upload_service,
        }
    }
}

/// Create incident routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/incidents", get(list_incidents).post(create_incident))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

/// Multipart schema for incident creation (documentation only)
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct CreateIncidentMultipart {
    pub title: String,
    pub description: Option<String>,
    /// One of structure, vehicle, wildfire (case-insensitive)
    pub incident_type: String,
    pub location: Option<String>,
    /// JPEG, PNG or WEBP image, at most 4 MiB
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

/// GET /api/incidents - List incidents
#[utoipa::path(
    get,
    path = "/api/incidents",
    responses(
        (status = 200, description = "Incidents, newest first", body = Vec<Incident>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn list_incidents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let incidents = state
        .incident_service
        .list()
        .await
        .map_err(|e| internal_error("Failed to list incidents", e))?;
    Ok(Json(incidents))
}

/// POST /api/incidents - Create incident
#[utoipa::path(
    post,
    path = "/api/incidents",
    request_body(content = CreateIncidentMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Incident created", body = Incident),
        (status = 400, description = "Missing or invalid fields, or rejected image", body = ErrorResponse),
        (status = 413, description = "Request body over the size limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn create_incident(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<Incident>), ApiError> {
    // Upload problems surface before field validation
    let (form, upload) = read_submission(request).await.map_err(upload_error)?;

    let mut input = form.validate()?;

    if let Some(upload) = upload {
        let stored = state
            .upload_service
            .store(upload)
            .await
            .map_err(|e| internal_error("Failed to store upload", e))?;
        input.image_url = Some(stored.url);
    }

    let incident = state
        .incident_service
        .create(input)
        .await
        .map_err(|e| internal_error("Failed to create incident", e))?;

    Ok((StatusCode::CREATED, Json(incident)))
}

fn upload_error(err: UploadError) -> ApiError {
    if matches!(err, UploadError::RequestTooLarge) {
        tracing::warn!(error = %err, "Rejected incident submission");
        return ErrorResponse::new(err.to_string()).into_response(StatusCode::PAYLOAD_TOO_LARGE);
    }
    if err.is_client_error() {
        tracing::warn!(error = %err, "Rejected incident submission");
        bad_request(err.to_string())
    } else {
        internal_error("Failed to read submission", err)
    }
}

async fn read_submission(
    request: Request,
) -> Result<(IncidentForm, Option<PendingUpload>), UploadError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| UploadError::Malformed(e.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<serde_json::Value>::from_request(request, &())
            .await
            .map_err(|e| UploadError::Malformed(e.body_text()))?;
        let form = IncidentForm::from_json(body).map_err(UploadError::Malformed)?;
        Ok((form, None))
    } else {
        Ok((IncidentForm::default(), None))
    }
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(IncidentForm, Option<PendingUpload>), UploadError> {
    let mut form = IncidentForm::default();
    let mut upload: Option<PendingUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name.as_deref() {
            // Browsers send an empty part when no file was picked
            Some("") => continue,
            Some(_) if name != IMAGE_FIELD => return Err(UploadError::UnexpectedFile(name)),
            Some(_) if upload.is_some() => return Err(UploadError::UnexpectedFile(name)),
            Some(_) => upload = Some(read_image(field).await?),
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                form.set_field(&name, value);
            }
        }
    }

    Ok((form, upload))
}

async fn read_image(mut field: Field<'_>) -> Result<PendingUpload, UploadError> {
    let mut upload = PendingUpload::begin(field.content_type(), field.file_name())?;
    while let Some(chunk) = field.chunk().await.map_err(image_error)? {
        upload.push_chunk(&chunk)?;
    }
    Ok(upload)
}

fn multipart_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::RequestTooLarge
    } else {
        UploadError::Malformed(err.body_text())
    }
}

/// Body limit hit while reading the image itself
fn image_error(err: MultipartError) -> UploadError {
    match multipart_error(err) {
        UploadError::RequestTooLarge => UploadError::FileTooLarge,
        other => other,
    }
}
