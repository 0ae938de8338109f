//! Image indexing: describe an image with a vision model, then embed the
//! description so it can be stored in the catalog's vector column.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use picpost_core::{
    defaults, detect_content_type, BlobStore, EmbeddingBackend, Error, ImagePostRepository, Result,
    Vector,
};

use crate::vision::VisionBackend;

/// Prompt used to obtain the description that gets embedded.
pub const DESCRIBE_PROMPT: &str =
    "Describe this image in detail, including objects, colors, mood, and context.";

/// Prompt used for caption suggestions.
pub const CAPTION_PROMPT: &str =
    "Generate a brief, engaging caption for this image (max 2 sentences).";

/// Outcome of one [`ImageIndexer::index_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Records that received an embedding.
    pub indexed: usize,
    /// Records whose blob is missing from the store.
    pub skipped: usize,
    /// Records where description or embedding failed.
    pub failed: usize,
}

/// Generates embeddings and captions for stored images.
pub struct ImageIndexer {
    embedder: Arc<dyn EmbeddingBackend>,
    vision: Arc<dyn VisionBackend>,
}

impl ImageIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingBackend>, vision: Arc<dyn VisionBackend>) -> Self {
        Self { embedder, vision }
    }

    /// Describe the image, embed the description, and check the vector fits
    /// the catalog column.
    pub async fn generate_image_embedding(&self, image: &[u8], mime_type: &str) -> Result<Vector> {
        let description = self
            .vision
            .describe_image(image, mime_type, DESCRIBE_PROMPT)
            .await?;
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::Inference("Vision model returned an empty description".to_string()));
        }

        let vector = self
            .embedder
            .embed_texts(&[description.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned".to_string()))?;

        let dimension = vector.as_slice().len();
        if dimension != defaults::EMBEDDING_DIMENSION {
            return Err(Error::Embedding(format!(
                "Embedding has {} dimensions, catalog expects {}",
                dimension,
                defaults::EMBEDDING_DIMENSION
            )));
        }
        Ok(vector)
    }

    /// Suggest a short caption for the image.
    pub async fn generate_caption(&self, image: &[u8], mime_type: &str) -> Result<String> {
        let caption = self
            .vision
            .describe_image(image, mime_type, CAPTION_PROMPT)
            .await?;
        Ok(caption.trim().to_string())
    }

    /// Embed up to `limit` catalog records that have no embedding yet.
    ///
    /// Per-record failures are counted and logged. Configuration failures
    /// (bad credentials, unknown model) abort the pass since every later
    /// record would fail the same way.
    pub async fn index_pending(
        &self,
        catalog: &dyn ImagePostRepository,
        blobs: &dyn BlobStore,
        limit: i64,
    ) -> Result<IndexReport> {
        let start = Instant::now();
        let pending = catalog.list_missing_embedding(limit).await?;
        let mut report = IndexReport::default();

        for post in pending {
            let bytes = match blobs.read(&post.filename).await {
                Ok(bytes) => bytes,
                Err(Error::NotFound(_)) => {
                    warn!(
                        subsystem = "indexer",
                        image_id = %post.id,
                        filename = %post.filename,
                        "Blob missing for catalog record, skipping"
                    );
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mime_type = detect_content_type(&post.filename, &bytes);
            match self.generate_image_embedding(&bytes, &mime_type).await {
                Ok(vector) => {
                    catalog.set_embedding(post.id, vector).await?;
                    debug!(subsystem = "indexer", image_id = %post.id, "Embedding stored");
                    report.indexed += 1;
                }
                Err(e @ Error::Config(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        subsystem = "indexer",
                        image_id = %post.id,
                        filename = %post.filename,
                        error = %e,
                        "Indexing failed for record"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            subsystem = "indexer",
            op = "index_pending",
            indexed = report.indexed,
            skipped = report.skipped,
            failed = report.failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Indexing pass complete"
        );
        Ok(report)
    }
}
