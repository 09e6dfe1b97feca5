// Common DTOs for public API
//
// These types are shared across multiple API endpoints.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use utoipa::ToSchema;

/// Error body returned to clients for any failed request.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal_error";

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    #[schema(example = "invalid incident_type")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Error tuple returned by handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// 400 with the given message
pub fn bad_request(message: impl Into<String>) -> ApiError {
    ErrorResponse::new(message).into_response(StatusCode::BAD_REQUEST)
}

/// Opaque 500; the detail only goes to the log.
pub fn internal_error(context: &str, error: impl Display) -> ApiError {
    tracing::error!("{}: {}", context, error);
    ErrorResponse::new(INTERNAL_ERROR_MESSAGE).into_response(StatusCode::INTERNAL_SERVER_ERROR)
}
