//! Image upload, listing, and retrieval handlers.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use utoipa::ToSchema;

use picpost_core::{ImagePostResponse, ImageUploadResponse};

use crate::services::UploadRequest;
use crate::{ApiError, AppState, ErrorBody};

/// Multipart form accepted by `POST /images`.
#[derive(ToSchema)]
pub struct ImageUploadForm {
    /// Image file; its declared content type must start with `image/`
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Optional caption, stored verbatim
    pub caption: Option<String>,
}

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// Upload an image with an optional caption.
///
/// Returns 201 with the stored record. The declared media type must be an
/// image; the bytes themselves are not inspected.
#[utoipa::path(post, path = "/api/v1/images", tag = "Images",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ImageUploadResponse),
        (status = 400, description = "Not an image, not multipart, or no file field", body = ErrorBody),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorBody),
        (status = 500, description = "Blob storage failed", body = ErrorBody),
        (status = 503, description = "Catalog unavailable", body = ErrorBody),
        (status = 504, description = "Storage or catalog timed out", body = ErrorBody),
    ))]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ImageUploadResponse>), ApiError> {
    let mut multipart = multipart?;
    let mut file: Option<UploadRequest> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let original_filename = field.file_name().map(str::to_string);
                let data = field.bytes().await?.to_vec();
                file = Some(UploadRequest {
                    data,
                    content_type,
                    original_filename,
                    caption: None,
                });
            }
            Some("caption") => caption = Some(field.text().await?),
            _ => {}
        }
    }

    let mut req = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    req.caption = caption;

    let image = state.uploads.upload(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImageUploadResponse {
            message: "Image uploaded successfully".to_string(),
            image,
        }),
    ))
}

/// List every image, newest first.
#[utoipa::path(get, path = "/api/v1/images", tag = "Images",
    responses(
        (status = 200, description = "All images, newest first", body = [ImagePostResponse]),
        (status = 503, description = "Catalog unavailable", body = ErrorBody),
    ))]
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImagePostResponse>>, ApiError> {
    Ok(Json(state.listing.list().await?))
}

/// Serve the stored bytes of an image.
#[utoipa::path(get, path = "/api/v1/images/{filename}", tag = "Images",
    params(("filename" = String, Path, description = "Generated storage filename")),
    responses(
        (status = 200, description = "Raw image bytes with the detected content type"),
        (status = 404, description = "Image not found", body = ErrorBody),
    ))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let image = state.retrieval.fetch(&filename).await?;

    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_LENGTH, HeaderValue::from(image.data.len())),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE_CACHE)),
    ];
    Ok((headers, image.data).into_response())
}
