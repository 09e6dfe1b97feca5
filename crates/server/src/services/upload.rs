// Image upload service
//
// Validates a single attached image (declared type + size), then stores it
// under the uploads directory with a generated name.
//
// Decision: The image is buffered in memory (at most MAX_UPLOAD_BYTES) and only
// written once the rest of the request has been validated.

use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum accepted image size.
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024; // 4 MiB

/// Declared content types accepted for images.
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// URL prefix under which stored uploads are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Multipart field name carrying the image.
pub const IMAGE_FIELD: &str = "image";

const RANDOM_SUFFIX_LEN: usize = 21;
const RANDOM_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_-";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type")]
    UnsupportedFileType(Option<String>),

    #[error("File too large")]
    FileTooLarge,

    #[error("Request too large")]
    RequestTooLarge,

    #[error("Unexpected file field: {0}")]
    UnexpectedFile(String),

    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the error was caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        !matches!(self, UploadError::Io(_))
    }
}

/// An accepted image waiting to be written to disk
#[derive(Debug)]
pub struct PendingUpload {
    content_type: &'static str,
    original_name: Option<String>,
    bytes: Vec<u8>,
}

impl PendingUpload {
    /// Start receiving a file, rejecting content types outside the allow-list.
    pub fn begin(
        content_type: Option<&str>,
        original_name: Option<&str>,
    ) -> Result<Self, UploadError> {
        let content_type = allowed_content_type(content_type).ok_or_else(|| {
            tracing::warn!(content_type = ?content_type, "Rejected upload content type");
            UploadError::UnsupportedFileType(content_type.map(str::to_string))
        })?;
        Ok(Self {
            content_type,
            original_name: original_name.map(str::to_string),
            bytes: Vec::new(),
        })
    }

    /// Append a chunk, failing as soon as the size cap is exceeded.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        if self.bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            tracing::warn!("Upload exceeds limit (max: {} bytes)", MAX_UPLOAD_BYTES);
            return Err(UploadError::FileTooLarge);
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }
}

/// A file written to the uploads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub filename: String,
    /// Public reference path, `/uploads/<filename>`
    pub url: String,
    pub path: PathBuf,
}

pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding stored uploads
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an accepted upload under a generated name
    pub async fn store(&self, upload: PendingUpload) -> Result<StoredUpload, UploadError> {
        let extension = file_extension(upload.original_name.as_deref(), upload.content_type);
        let filename = generate_filename(&extension);
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::debug!(
            filename = %filename,
            size = upload.bytes.len(),
            content_type = upload.content_type,
            "Stored upload"
        );

        Ok(StoredUpload {
            url: format!("{}/{}", UPLOADS_URL_PREFIX, filename),
            filename,
            path,
        })
    }
}

/// Match a declared content type against the allow-list, ignoring case and
/// parameters (`image/PNG; charset=binary` → `image/png`).
pub fn allowed_content_type(content_type: Option<&str>) -> Option<&'static str> {
    let essence = content_type?
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES
        .into_iter()
        .find(|allowed| *allowed == essence)
}

/// Extension for a stored file, including the leading dot.
///
/// Taken from the original filename when it has a plain alphanumeric one,
/// otherwise derived from the content type. Empty when neither applies.
pub fn file_extension(original_name: Option<&str>, content_type: &str) -> String {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()));

    from_name.unwrap_or_else(|| {
        match content_type {
            "image/jpeg" => ".jpg",
            "image/png" => ".png",
            "image/webp" => ".webp",
            _ => "",
        }
        .to_string()
    })
}

/// `<unix-millis>-<random><ext>`
pub fn generate_filename(extension: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| RANDOM_ALPHABET[rng.gen_range(0..RANDOM_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, extension)
}
