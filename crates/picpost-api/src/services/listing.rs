//! Listing flow: the whole catalog, newest first.

use std::sync::Arc;
use std::time::Duration;

use picpost_core::{ImagePostRepository, ImagePostResponse, Result};

use super::bounded;

pub struct ListingService {
    catalog: Arc<dyn ImagePostRepository>,
    api_prefix: String,
    db_timeout: Duration,
}

impl ListingService {
    pub fn new(
        catalog: Arc<dyn ImagePostRepository>,
        api_prefix: impl Into<String>,
        db_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            api_prefix: api_prefix.into(),
            db_timeout,
        }
    }

    pub async fn list(&self) -> Result<Vec<ImagePostResponse>> {
        let posts = bounded(
            self.db_timeout,
            "catalog listing",
            self.catalog.list_newest_first(),
        )
        .await?;

        Ok(posts
            .iter()
            .map(|p| p.to_response(&self.api_prefix))
            .collect())
    }
}
