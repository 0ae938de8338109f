//! Core trait definitions for picpost.
//!
//! These traits are the seams between the HTTP services and their storage
//! and inference collaborators.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{BlobEntry, ImagePost, NewImagePost, Result, Vector};

// =============================================================================
// CATALOG TRAITS
// =============================================================================

/// Repository for image-post catalog records.
#[async_trait]
pub trait ImagePostRepository: Send + Sync {
    /// Insert a new record and return it as stored.
    async fn insert(&self, post: NewImagePost) -> Result<ImagePost>;

    /// All records, `created_at` descending, ties newest-inserted first.
    async fn list_newest_first(&self) -> Result<Vec<ImagePost>>;

    /// Subset of `filenames` that have a catalog record.
    async fn existing_filenames(&self, filenames: &[String]) -> Result<HashSet<String>>;

    /// Oldest records that have no embedding yet.
    async fn list_missing_embedding(&self, limit: i64) -> Result<Vec<ImagePost>>;

    /// Store the embedding vector for a record.
    async fn set_embedding(&self, id: Uuid, embedding: Vector) -> Result<()>;
}

// =============================================================================
// BLOB TRAITS
// =============================================================================

/// Storage backend for raw image bytes, addressed by flat blob name.
///
/// Allows abstracting over filesystem, S3, or other storage providers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write data under the given name, replacing nothing (names are unique).
    async fn write(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Read the full contents of a blob.
    async fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Delete a blob if present.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Enumerate every stored file, including incomplete writes.
    async fn list(&self) -> Result<Vec<BlobEntry>>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
