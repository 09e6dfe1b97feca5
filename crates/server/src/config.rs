// Server configuration loaded from environment variables.
// Decision: Read once at startup; nothing is reloaded at runtime
// Decision: Defaults match local development (API on :4000, UI dev server on :5173)

use std::path::PathBuf;

use crate::storage::INCIDENTS_FILE_NAME;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Single origin allowed for cross-origin requests
    pub cors_origin: String,
    /// Directory holding the incident mirror file
    pub data_dir: PathBuf,
    /// Directory holding uploaded images
    pub uploads_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `PORT`: Listening port (default: 4000)
    /// - `HOST`: Bind address (default: "0.0.0.0")
    /// - `CORS_ORIGIN`: Allowed cross-origin source (default: "http://localhost:5173")
    /// - `DATA_DIR`: Directory for incidents.json (default: "data")
    /// - `UPLOADS_DIR`: Directory for uploaded images (default: "uploads")
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, fallback = DEFAULT_PORT, "Invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            cors_origin: var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            uploads_dir: var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
        }
    }

    /// `host:port` for the TCP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Path of the incident mirror file
    pub fn incidents_file(&self) -> PathBuf {
        self.data_dir.join(INCIDENTS_FILE_NAME)
    }
}
