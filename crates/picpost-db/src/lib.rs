//! # picpost-db
//!
//! Storage layer for picpost.
//!
//! This crate provides:
//! - Connection pool management
//! - The PostgreSQL image-post catalog (with a pgvector embedding column)
//! - Filesystem blob storage for the uploaded bytes
//!
//! ## Example
//!
//! ```rust,ignore
//! use picpost_db::{Database, ImagePostRepository, NewImagePost};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/picpost").await?;
//!
//!     for post in db.images.list_newest_first().await? {
//!         println!("{} {}", post.created_at, post.filename);
//!     }
//!     Ok(())
//! }
//! ```
pub mod file_storage;
pub mod image_posts;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so the API crate's tests can use the in-memory catalog
pub mod test_fixtures;

// Re-export core types
pub use picpost_core::*;

pub use file_storage::FilesystemBackend;
pub use image_posts::PgImagePostRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Image-post catalog.
    pub images: PgImagePostRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            images: PgImagePostRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the database with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect to the database with a custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}
