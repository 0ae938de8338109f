//! Image-post catalog repository.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use picpost_core::{Error, ImagePost, ImagePostRepository, NewImagePost, Result, Vector};

const POST_COLUMNS: &str = "id, filename, caption, likes, created_at";

/// PostgreSQL implementation of ImagePostRepository.
#[derive(Clone)]
pub struct PgImagePostRepository {
    pool: PgPool,
}

impl PgImagePostRepository {
    /// Create a new PgImagePostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> ImagePost {
    ImagePost {
        id: row.get("id"),
        filename: row.get("filename"),
        caption: row.get("caption"),
        likes: row.get("likes"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ImagePostRepository for PgImagePostRepository {
    async fn insert(&self, post: NewImagePost) -> Result<ImagePost> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO image_posts (id, filename, caption, likes, created_at)
               VALUES ($1, $2, $3, 0, $4)
               RETURNING {POST_COLUMNS}"#
        ))
        .bind(post.id)
        .bind(&post.filename)
        .bind(&post.caption)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from_store)?;

        debug!(
            subsystem = "database",
            component = "image_posts",
            op = "insert",
            image_id = %post.id,
            filename = %post.filename,
            "Catalog row inserted"
        );
        Ok(post_from_row(&row))
    }

    async fn list_newest_first(&self) -> Result<Vec<ImagePost>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS}
               FROM image_posts
               ORDER BY created_at DESC, seq DESC"#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from_store)?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn existing_filenames(&self, filenames: &[String]) -> Result<HashSet<String>> {
        if filenames.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = sqlx::query("SELECT filename FROM image_posts WHERE filename = ANY($1)")
            .bind(filenames)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from_store)?;

        Ok(rows.iter().map(|r| r.get("filename")).collect())
    }

    async fn list_missing_embedding(&self, limit: i64) -> Result<Vec<ImagePost>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {POST_COLUMNS}
               FROM image_posts
               WHERE embedding IS NULL
               ORDER BY created_at ASC, seq ASC
               LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from_store)?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn set_embedding(&self, id: Uuid, embedding: Vector) -> Result<()> {
        let result = sqlx::query("UPDATE image_posts SET embedding = $2 WHERE id = $1")
            .bind(id)
            .bind(embedding)
            .execute(&self.pool)
            .await
            .map_err(Error::from_store)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Image post {} not found", id)));
        }
        Ok(())
    }
}
