use async_trait::async_trait;
use bon::bon;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::batch::{Level, LogBatch, LogRecord};
use super::keys;
use super::retention::RetentionSweeper;
use crate::config::ExportConfig;
use crate::observability::Metrics;
use crate::storage::{ObjectStoreClient, Result, StoredObject};

/// Path taken by one export cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing to write
    Skipped,
    /// No readable current object; the batch became a new one
    Created { key: String },
    /// Batch appended to the current object, `size` is the new total
    Appended { key: String, size: u64 },
    /// Current object archived under `archive`, batch written fresh
    Rotated { key: String, archive: String },
    /// Append or rotation failed midway; the batch was written alone
    Recovered { key: String },
}

/// Host-facing capability: the logging pipeline hands over what it buffered.
///
/// Implementations must never fail the caller; a lost batch is acceptable.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn flush(&self, records: Vec<LogRecord>);
}

/// Appends batches to the day's log object, rotating it past a size
/// threshold and sweeping expired objects afterwards.
///
/// Each cycle re-reads the remote state; nothing is cached between calls.
/// There is no locking around the read-modify-write, so one writer per
/// directory is assumed.
pub struct LogExporter {
    store: Arc<dyn ObjectStoreClient>,
    directory: String,
    rotate_at_bytes: u64,
    levels: Vec<Level>,
    list_page_size: usize,
    sweeper: RetentionSweeper,
    metrics: Arc<Metrics>,
}

#[bon]
impl LogExporter {
    #[builder]
    pub fn new(
        store: Arc<dyn ObjectStoreClient>,
        #[builder(into)] directory: String,
        rotate_at_bytes: u64,
        #[builder(default)] retention_days: u32,
        #[builder(default = vec![Level::Error, Level::Warning])] levels: Vec<Level>,
        #[builder(default = 1000)] list_page_size: usize,
        #[builder(default)] metrics: Arc<Metrics>,
    ) -> Self {
        let directory = directory.trim_matches('/').to_string();
        let sweeper = RetentionSweeper::new(
            store.clone(),
            directory.clone(),
            retention_days,
            list_page_size,
        );

        Self {
            store,
            directory,
            rotate_at_bytes,
            levels,
            list_page_size,
            sweeper,
            metrics,
        }
    }
}

impl LogExporter {
    pub fn from_config(config: &ExportConfig, store: Arc<dyn ObjectStoreClient>) -> Self {
        Self::builder()
            .store(store)
            .directory(config.directory.clone())
            .rotate_at_bytes(config.rotate_at_bytes.as_u64())
            .retention_days(config.retention_days)
            .levels(config.levels.clone())
            .list_page_size(config.list_page_size)
            .build()
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn sweeper(&self) -> &RetentionSweeper {
        &self.sweeper
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Run one export cycle for the UTC day of `now`.
    ///
    /// Fetch failures of any kind are treated as an absent object. Failures
    /// while appending or rotating fall back to writing the batch alone; only
    /// a failure of that final write is returned.
    pub async fn export_at(&self, batch: LogBatch, now: DateTime<Utc>) -> Result<ExportOutcome> {
        if batch.is_empty() {
            return Ok(ExportOutcome::Skipped);
        }

        let blob = Bytes::from(batch.format());
        let date = now.date_naive();
        let key = keys::current_key(&self.directory, date);

        let outcome = match self.fetch_current(&key).await {
            Some(current) => match self.rotate_or_append(&key, date, current, &blob).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        key = %key,
                        error = %e,
                        "Log export failed midway, writing batch as a fresh object"
                    );
                    self.store.put(&key, blob).await?;
                    ExportOutcome::Recovered { key }
                }
            },
            None => {
                self.store.put(&key, blob).await?;
                debug!(key = %key, "Created log object");
                ExportOutcome::Created { key }
            }
        };

        self.sweep(now).await;

        Ok(outcome)
    }

    async fn fetch_current(&self, key: &str) -> Option<StoredObject> {
        match self.store.get(key).await {
            Ok(object) => Some(object),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read current log object, starting a new one");
                None
            }
        }
    }

    async fn rotate_or_append(
        &self,
        key: &str,
        date: NaiveDate,
        current: StoredObject,
        blob: &Bytes,
    ) -> Result<ExportOutcome> {
        if current.size > self.rotate_at_bytes {
            let archive = self.archive_current(key, date).await?;
            self.store.put(key, blob.clone()).await?;

            info!(key, archive = %archive, size = current.size, "Rotated log object");
            return Ok(ExportOutcome::Rotated {
                key: key.to_string(),
                archive,
            });
        }

        let mut body = BytesMut::with_capacity(current.body.len() + blob.len());
        body.extend_from_slice(&current.body);
        body.extend_from_slice(blob);
        let size = body.len() as u64;

        // Not atomic: a failure between these two calls loses the previous body.
        self.store.delete(key).await?;
        self.store.put(key, body.freeze()).await?;

        debug!(key, size, "Appended to log object");
        Ok(ExportOutcome::Appended {
            key: key.to_string(),
            size,
        })
    }

    /// Copy the current object to the next free sequence key and remove it.
    /// The archive is not read back.
    async fn archive_current(&self, key: &str, date: NaiveDate) -> Result<String> {
        let existing = self.list_day(date).await?;
        let archive = keys::next_archive_key(&self.directory, date, &existing);

        self.store.copy(key, &archive).await?;
        self.store.delete(key).await?;

        Ok(archive)
    }

    /// Keys in the directory starting with the day's stamp. Listings come back
    /// in lexicographic order, so paging stops at the first key past the day.
    async fn list_day(&self, date: NaiveDate) -> Result<Vec<String>> {
        let day_prefix = format!("{}/{}", self.directory, keys::date_stamp(date));
        let day_prefix = day_prefix.trim_start_matches('/');

        let mut day_keys = Vec::new();
        let mut after = Some(day_prefix.to_string());

        while let Some(start_after) = after.take() {
            let page = self
                .store
                .list_page(&self.directory, Some(&start_after), self.list_page_size)
                .await?;

            for object in page.objects {
                if !object.key.starts_with(day_prefix) {
                    return Ok(day_keys);
                }
                day_keys.push(object.key);
            }
            after = page.next;
        }

        Ok(day_keys)
    }

    async fn sweep(&self, now: DateTime<Utc>) {
        if !self.sweeper.is_enabled() {
            return;
        }

        match self.sweeper.run(now).await {
            Ok(report) => self.metrics.record_sweep(&report),
            Err(e) => {
                self.metrics.sweep_failed();
                warn!(directory = %self.directory, error = %e, "Retention sweep failed");
            }
        }
    }
}

#[async_trait]
impl LogSink for LogExporter {
    async fn flush(&self, records: Vec<LogRecord>) {
        let batch = LogBatch::from_records(records, &self.levels);

        match self.export_at(batch, Utc::now()).await {
            Ok(outcome) => self.metrics.record_outcome(&outcome),
            Err(e) => {
                self.metrics.export_failed();
                warn!(
                    directory = %self.directory,
                    error = %e,
                    "Dropping log batch after failed export"
                );
            }
        }
    }
}
