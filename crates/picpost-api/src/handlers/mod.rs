//! HTTP handlers for picpost-api.

pub mod images;
pub mod system;

pub use images::{get_image, list_images, upload_image, ImageUploadForm};
pub use system::{health, hello, root, HealthResponse, HelloQuery, HelloResponse, RootResponse};
