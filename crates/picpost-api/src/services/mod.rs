//! Service layer: the upload, listing, and retrieval flows plus the
//! orphan-blob sweep. Handlers stay thin and delegate here.

pub mod listing;
pub mod retrieval;
pub mod sweeper;
pub mod upload;

use std::future::Future;
use std::time::Duration;

use picpost_core::{Error, Result};

pub use listing::ListingService;
pub use retrieval::{RetrievalService, RetrievedImage};
pub use sweeper::{OrphanSweeper, SweepReport};
pub use upload::{UploadRequest, UploadService};

/// Run `fut` under `limit`, reporting expiry as [`Error::Timeout`].
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(format!(
            "{} did not complete within {}s",
            what,
            limit.as_secs_f64()
        ))),
    }
}
