//! Upload flow: validate, store the blob, then record it in the catalog.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use picpost_core::{
    image_extension, is_image_media_type, BlobStore, Error, ImagePost, ImagePostRepository,
    ImagePostResponse, NewImagePost, Result,
};

use super::bounded;

/// One uploaded file as received from the client.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    /// Client-declared media type; trusted as-is, no sniffing.
    pub content_type: Option<String>,
    /// Only its extension is used, and only if allow-listed.
    pub original_filename: Option<String>,
    pub caption: Option<String>,
}

pub struct UploadService {
    catalog: Arc<dyn ImagePostRepository>,
    blobs: Arc<dyn BlobStore>,
    api_prefix: String,
    storage_timeout: Duration,
    db_timeout: Duration,
}

impl UploadService {
    pub fn new(
        catalog: Arc<dyn ImagePostRepository>,
        blobs: Arc<dyn BlobStore>,
        api_prefix: impl Into<String>,
        storage_timeout: Duration,
        db_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            blobs,
            api_prefix: api_prefix.into(),
            storage_timeout,
            db_timeout,
        }
    }

    /// Store an uploaded image and return its public record.
    ///
    /// The blob is written before the catalog row. If the insert fails the
    /// blob is left behind for the orphan sweep.
    pub async fn upload(&self, req: UploadRequest) -> Result<ImagePostResponse> {
        let start = Instant::now();

        if !is_image_media_type(req.content_type.as_deref()) {
            return Err(Error::InvalidMediaType("File must be an image".to_string()));
        }

        let ext = image_extension(req.original_filename.as_deref());
        let filename = format!("{}{}", Uuid::new_v4(), ext);

        bounded(
            self.storage_timeout,
            "blob write",
            self.blobs.write(&filename, &req.data),
        )
        .await?;

        let post = NewImagePost {
            id: Uuid::new_v4(),
            filename: filename.clone(),
            caption: req.caption,
            created_at: Utc::now(),
        };

        let stored = match self.insert_with_retry(post).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    subsystem = "api",
                    component = "upload",
                    filename = %filename,
                    error = %e,
                    "Catalog insert failed; blob left as orphan"
                );
                return Err(e);
            }
        };

        info!(
            subsystem = "api",
            component = "upload",
            op = "upload",
            image_id = %stored.id,
            filename = %stored.filename,
            size_bytes = req.data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Image uploaded"
        );
        Ok(stored.to_response(&self.api_prefix))
    }

    /// Insert once, retrying a single time on a transient store error.
    async fn insert_with_retry(&self, post: NewImagePost) -> Result<ImagePost> {
        let first = bounded(
            self.db_timeout,
            "catalog insert",
            self.catalog.insert(post.clone()),
        )
        .await;

        match first {
            Err(e) if e.is_transient() => {
                warn!(
                    subsystem = "api",
                    component = "upload",
                    image_id = %post.id,
                    error = %e,
                    "Transient catalog error, retrying insert once"
                );
                bounded(self.db_timeout, "catalog insert", self.catalog.insert(post)).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picpost_db::test_fixtures::InMemoryImagePostRepository;
    use picpost_db::FilesystemBackend;
    use tempfile::TempDir;

    fn service(
        catalog: Arc<InMemoryImagePostRepository>,
        dir: &TempDir,
    ) -> UploadService {
        UploadService::new(
            catalog,
            Arc::new(FilesystemBackend::new(dir.path())),
            "/api/v1",
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
    }

    fn png_request() -> UploadRequest {
        UploadRequest {
            data: b"\x89PNG\r\n\x1a\nrest".to_vec(),
            content_type: Some("image/png".to_string()),
            original_filename: Some("holiday.PNG".to_string()),
            caption: Some("beach".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_row() {
        let dir = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryImagePostRepository::new());
        let svc = service(catalog.clone(), &dir);

        let image = svc.upload(png_request()).await.unwrap();

        assert!(image.image_url.starts_with("/api/v1/images/"));
        assert!(image.image_url.ends_with(".png"));
        assert_eq!(image.caption.as_deref(), Some("beach"));
        assert_eq!(image.likes, 0);
        assert_eq!(catalog.len(), 1);

        let filename = image.image_url.rsplit('/').next().unwrap();
        assert_ne!(filename.trim_end_matches(".png"), image.id.to_string());
        assert!(dir.path().join(filename).exists());
    }

    #[tokio::test]
    async fn test_non_image_rejected_before_any_write() {
        let dir = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryImagePostRepository::new());
        let svc = service(catalog.clone(), &dir);

        let req = UploadRequest {
            content_type: Some("text/plain".to_string()),
            ..png_request()
        };
        let err = svc.upload(req).await.unwrap_err();

        assert!(matches!(err, Error::InvalidMediaType(_)));
        assert!(catalog.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_media_type_rejected() {
        let dir = TempDir::new().unwrap();
        let svc = service(Arc::new(InMemoryImagePostRepository::new()), &dir);
        let req = UploadRequest {
            content_type: None,
            ..png_request()
        };
        assert!(matches!(
            svc.upload(req).await.unwrap_err(),
            Error::InvalidMediaType(_)
        ));
    }

    #[tokio::test]
    async fn test_disallowed_extension_falls_back_to_jpg() {
        let dir = TempDir::new().unwrap();
        let svc = service(Arc::new(InMemoryImagePostRepository::new()), &dir);
        let req = UploadRequest {
            original_filename: Some("../../etc/evil.sh".to_string()),
            ..png_request()
        };
        let image = svc.upload(req).await.unwrap();
        assert!(image.image_url.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_single_transient_failure_is_retried() {
        let dir = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryImagePostRepository::new());
        catalog.fail_next_inserts(1);
        let svc = service(catalog.clone(), &dir);

        svc.upload(png_request()).await.unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_persistent_failure_surfaces_and_leaves_orphan() {
        let dir = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryImagePostRepository::new());
        catalog.fail_next_inserts(2);
        let svc = service(catalog.clone(), &dir);

        let err = svc.upload(png_request()).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert!(catalog.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
