// Uploaded file serving
//
// GET /uploads/{filename} - Stored image bytes with cache validators
//
// Responses carry ETag, Last-Modified and a one hour public max-age.
// If-None-Match / If-Modified-Since revalidation answers 304.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::SystemTime;

use crate::services::UploadService;

/// Cache-Control for served uploads
pub const UPLOAD_CACHE_CONTROL: &str = "public, max-age=3600";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// App state for upload routes
#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    pub fn new(upload_service: Arc<UploadService>) -> Self {
        Self { upload_service }
    }
}

/// Create upload serving routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/uploads/:filename", get(serve_upload))
        .with_state(state)
}

/// GET /uploads/{filename} - Serve a stored upload
#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    params(
        ("filename" = String, Path, description = "Stored upload file name")
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 304, description = "Not modified"),
        (status = 404, description = "Not found")
    ),
    tag = "uploads"
)]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_safe_filename(&filename) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.upload_service.dir().join(&filename);

    let Some((content, modified)) = load_file(&path).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let etag = generate_etag(&content);
    let last_modified = modified.map(DateTime::<Utc>::from);

    let if_none_match = header_str(&headers, header::IF_NONE_MATCH);
    let not_modified = if if_none_match.is_some() {
        check_etag_match(if_none_match, &etag)
    } else {
        match (header_str(&headers, header::IF_MODIFIED_SINCE), last_modified) {
            (Some(since), Some(modified)) => not_modified_since(since, modified),
            _ => false,
        }
    };

    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        let mut response = Response::new(Body::from(content));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type_for(&filename)),
        );
        response
    };

    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(UPLOAD_CACHE_CONTROL),
    );
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    if let Some(modified) = last_modified {
        if let Ok(value) = HeaderValue::from_str(&format_http_date(modified)) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
    response
}

async fn load_file(path: &std::path::Path) -> Option<(Vec<u8>, Option<SystemTime>)> {
    let metadata = tokio::fs::metadata(path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }
    let content = tokio::fs::read(path).await.ok()?;
    Some((content, metadata.modified().ok()))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Plain file names only: no separators, traversal or dotfiles.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

/// Content type from the stored file's extension
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Quoted ETag from a content hash, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether `If-None-Match` (single, list, or `*`) matches the ETag
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client| {
        client
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

/// HTTP dates have second resolution, so compare whole seconds.
fn not_modified_since(since: &str, modified: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc2822(since)
        .map(|since| modified.timestamp() <= since.timestamp())
        .unwrap_or(false)
}

fn format_http_date(value: DateTime<Utc>) -> String {
    value.format(HTTP_DATE_FORMAT).to_string()
}
