//! Age-based purge of log objects

use chrono::{DateTime, Days, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::storage::{ObjectStoreClient, Result, list_all};

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes objects under the log directory whose last modification is older
/// than `retention_days` calendar days.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<dyn ObjectStoreClient>,
    directory: String,
    retention_days: u32,
    page_size: usize,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<dyn ObjectStoreClient>,
        directory: impl Into<String>,
        retention_days: u32,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            directory: directory.into(),
            retention_days,
            page_size: page_size.max(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.retention_days > 0
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Cutoff instant; objects modified strictly before it are expired
    pub fn limit(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_days(Days::new(u64::from(self.retention_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Run one sweep. A failed listing aborts the sweep; a failed delete is
    /// logged and counted and the remaining objects are still processed.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        if !self.is_enabled() {
            return Ok(report);
        }

        let limit = self.limit(now);
        let objects = list_all(self.store.as_ref(), &self.directory, None, self.page_size).await?;
        report.scanned = objects.len();

        for object in objects.iter().filter(|o| o.last_modified < limit) {
            match self.store.delete(&object.key).await {
                Ok(()) => {
                    debug!(
                        key = %object.key,
                        last_modified = %object.last_modified,
                        "Deleted expired log object"
                    );
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!(key = %object.key, error = %e, "Failed to delete expired log object");
                    report.failed += 1;
                }
            }
        }

        if report.deleted > 0 || report.failed > 0 {
            info!(
                directory = %self.directory,
                retention_days = self.retention_days,
                scanned = report.scanned,
                deleted = report.deleted,
                failed = report.failed,
                "Retention sweep complete"
            );
        }

        Ok(report)
    }
}
