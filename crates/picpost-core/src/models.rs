//! Domain models for image posts and blobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use pgvector::Vector;

// =============================================================================
// IMAGE POST TYPES
// =============================================================================

/// A catalog record for one uploaded image.
///
/// The `embedding` column exists in storage but is write-only from the
/// application's point of view, so it is not carried on this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePost {
    pub id: Uuid,
    pub filename: String,
    pub caption: Option<String>,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
}

impl ImagePost {
    /// Retrieval URL for this post's blob under the given API prefix.
    pub fn image_url(&self, api_prefix: &str) -> String {
        image_url(api_prefix, &self.filename)
    }

    /// Public representation returned by the HTTP API.
    pub fn to_response(&self, api_prefix: &str) -> ImagePostResponse {
        ImagePostResponse {
            id: self.id,
            image_url: self.image_url(api_prefix),
            caption: self.caption.clone(),
            created_at: self.created_at,
            likes: self.likes,
        }
    }
}

/// Build `{prefix}/images/{filename}`, tolerating a trailing slash on the prefix.
pub fn image_url(api_prefix: &str, filename: &str) -> String {
    format!("{}/images/{}", api_prefix.trim_end_matches('/'), filename)
}

/// Values for a new catalog row. `likes` always starts at zero.
#[derive(Debug, Clone)]
pub struct NewImagePost {
    pub id: Uuid,
    pub filename: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Image post as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImagePostResponse {
    /// Unique image ID
    pub id: Uuid,
    /// URL to access the image
    pub image_url: String,
    /// Image caption
    pub caption: Option<String>,
    /// Upload timestamp
    pub created_at: DateTime<Utc>,
    /// Number of likes
    pub likes: i32,
}

/// Image upload success response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageUploadResponse {
    /// Success message
    pub message: String,
    /// Uploaded image details
    pub image: ImagePostResponse,
}

// =============================================================================
// BLOB TYPES
// =============================================================================

/// A file present in the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}
