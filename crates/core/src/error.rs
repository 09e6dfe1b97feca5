// Error types for incident handling

use thiserror::Error;

/// Result type alias for incident operations
pub type Result<T> = std::result::Result<T, IncidentError>;

/// Errors that can occur while validating or storing incidents
#[derive(Debug, Error)]
pub enum IncidentError {
    /// Incident type is not one of the fixed set
    #[error("invalid incident_type: {0}")]
    InvalidIncidentType(String),

    /// Storage backend error
    #[error("Incident store error: {0}")]
    Store(String),

    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IncidentError {
    /// Create a storage error
    pub fn store(msg: impl Into<String>) -> Self {
        IncidentError::Store(msg.into())
    }
}
