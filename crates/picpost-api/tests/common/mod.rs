//! Shared helpers for driving the router in process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;

use picpost_api::{router, AppConfig, AppState};
use picpost_core::BlobStore;
use picpost_db::test_fixtures::InMemoryImagePostRepository;
use picpost_db::FilesystemBackend;

pub const BOUNDARY: &str = "picpost-test-boundary-7MA4YWxkTrZu0gW";

/// A router over an in-memory catalog and a temp-dir blob store.
pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<InMemoryImagePostRepository>,
    pub blob_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let blob_dir = TempDir::new().unwrap();
        let blobs = Arc::new(FilesystemBackend::new(blob_dir.path()));
        let catalog = Arc::new(InMemoryImagePostRepository::new());
        Self::with_parts(config, catalog, blobs, blob_dir)
    }

    pub fn with_parts(
        config: AppConfig,
        catalog: Arc<InMemoryImagePostRepository>,
        blobs: Arc<dyn BlobStore>,
        blob_dir: TempDir,
    ) -> Self {
        let state = AppState::new(Arc::new(config), catalog.clone(), blobs);
        Self {
            router: router(state),
            catalog,
            blob_dir,
        }
    }

    /// Number of regular files under the blob root.
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.blob_dir.path())
            .map(|d| d.count())
            .unwrap_or(0)
    }
}

/// One multipart form field.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    let body = multipart_body(parts);
    Request::post("/api/v1/images")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

/// Smallest byte sequence that sniffs as PNG.
pub fn png_bytes(tag: u8) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    data.extend_from_slice(&[tag; 32]);
    data
}
