//! Orphan sweep: delete blobs that no catalog row references.
//!
//! Orphans appear when a blob write succeeds but the catalog insert after it
//! fails, or when a process dies mid-write and leaves a partial file.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use picpost_core::{BlobStore, ImagePostRepository, Result};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Blobs old enough to be considered.
    pub scanned: usize,
    pub deleted: usize,
    /// Orphans that could not be deleted.
    pub retained: usize,
}

#[derive(Clone)]
pub struct OrphanSweeper {
    catalog: Arc<dyn ImagePostRepository>,
    blobs: Arc<dyn BlobStore>,
    min_age: Duration,
}

impl OrphanSweeper {
    /// `min_age` keeps the sweep away from uploads still between their
    /// blob write and catalog insert.
    pub fn new(
        catalog: Arc<dyn ImagePostRepository>,
        blobs: Arc<dyn BlobStore>,
        min_age: Duration,
    ) -> Self {
        Self {
            catalog,
            blobs,
            min_age,
        }
    }

    pub async fn sweep(&self) -> Result<SweepReport> {
        let start = Instant::now();
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.min_age).unwrap_or(chrono::Duration::zero());

        let candidates: Vec<String> = self
            .blobs
            .list()
            .await?
            .into_iter()
            .filter(|b| b.modified_at <= cutoff)
            .map(|b| b.name)
            .collect();

        let mut report = SweepReport {
            scanned: candidates.len(),
            ..Default::default()
        };
        if candidates.is_empty() {
            return Ok(report);
        }

        let referenced = self.catalog.existing_filenames(&candidates).await?;

        for name in candidates.iter().filter(|n| !referenced.contains(*n)) {
            match self.blobs.delete(name).await {
                Ok(()) => {
                    debug!(subsystem = "sweeper", blob = %name, "Deleted orphan blob");
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!(subsystem = "sweeper", blob = %name, error = %e, "Failed to delete orphan blob");
                    report.retained += 1;
                }
            }
        }

        info!(
            subsystem = "sweeper",
            op = "sweep",
            scanned = report.scanned,
            deleted = report.deleted,
            retained = report.retained,
            duration_ms = start.elapsed().as_millis() as u64,
            "Orphan sweep complete"
        );
        Ok(report)
    }

    /// Run [`sweep`](Self::sweep) every `interval`, first tick one interval
    /// after startup.
    pub fn spawn_periodic(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(
                subsystem = "sweeper",
                interval_secs = interval.as_secs(),
                "Orphan sweeper started"
            );
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep().await {
                    error!(subsystem = "sweeper", error = %e, "Orphan sweep failed");
                }
            }
        })
    }
}
