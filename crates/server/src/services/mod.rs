// Services layer
//
// Business logic between the HTTP routes and storage.

pub mod incident;
pub mod upload;

pub use incident::IncidentService;
pub use upload::{PendingUpload, StoredUpload, UploadError, UploadService};
