//! OpenAPI document served alongside Swagger UI.

use utoipa::OpenApi;

use picpost_core::{ImagePostResponse, ImageUploadResponse};

use crate::error::ErrorBody;
use crate::handlers::{self, HealthResponse, HelloResponse, ImageUploadForm, RootResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "picpost API",
        description = "Image upload and catalog service with greeting and health endpoints"
    ),
    paths(
        handlers::system::root,
        handlers::system::health,
        handlers::system::hello,
        handlers::images::upload_image,
        handlers::images::list_images,
        handlers::images::get_image,
    ),
    components(schemas(
        HealthResponse,
        HelloResponse,
        RootResponse,
        ImagePostResponse,
        ImageUploadResponse,
        ImageUploadForm,
        ErrorBody,
    )),
    tags(
        (name = "Root", description = "Service banner"),
        (name = "Health", description = "Liveness checks"),
        (name = "Greeting", description = "Greeting endpoint"),
        (name = "Images", description = "Image upload, listing, and retrieval")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_image_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/v1/images"));
        assert!(paths.iter().any(|p| *p == "/api/v1/images/{filename}"));
        assert!(paths.iter().any(|p| *p == "/api/v1/health"));
        assert!(paths.iter().any(|p| *p == "/"));
    }
}
