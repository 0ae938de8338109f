//! Retrieval flow: serve stored bytes by generated filename.

use std::sync::Arc;
use std::time::Duration;

use picpost_core::media::PARTIAL_SUFFIX;
use picpost_core::{detect_content_type, is_safe_blob_name, BlobStore, Error, Result};

use super::bounded;

/// Bytes of a stored image and the content type to serve them with.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedImage {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct RetrievalService {
    blobs: Arc<dyn BlobStore>,
    storage_timeout: Duration,
}

impl RetrievalService {
    pub fn new(blobs: Arc<dyn BlobStore>, storage_timeout: Duration) -> Self {
        Self {
            blobs,
            storage_timeout,
        }
    }

    /// Look up a blob by name. Unsafe names are reported as not found
    /// without touching storage.
    pub async fn fetch(&self, filename: &str) -> Result<RetrievedImage> {
        if !is_safe_blob_name(filename) || filename.ends_with(PARTIAL_SUFFIX) {
            return Err(not_found());
        }

        let data = match bounded(self.storage_timeout, "blob read", self.blobs.read(filename)).await
        {
            Ok(data) => data,
            Err(Error::NotFound(_)) => return Err(not_found()),
            Err(e) => return Err(e),
        };

        let content_type = detect_content_type(filename, &data);
        Ok(RetrievedImage { data, content_type })
    }
}

fn not_found() -> Error {
    Error::NotFound("Image not found".to_string())
}
