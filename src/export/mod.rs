//! Rolling log export into an object-storage bucket
//!
//! ## Key Components
//!
//! - [`LogExporter`] - one export cycle: fetch, append or rotate, write
//! - [`RetentionSweeper`] - purges objects older than the retention window
//! - [`keys`] - current and archive key naming
//! - [`LogBatch`] - severity-filtered lines rendered into one blob
//! - [`LogSink`] - the single call the host logging pipeline makes
//!
//! ## Example
//!
//! ```rust,ignore
//! use bucketlog::config::Config;
//! use bucketlog::export::{self, Level, LogRecord, LogSink};
//!
//! let config = Config::load_unvalidated(path)?;
//! if let Some(exporter) = export::activate(&config) {
//!     exporter.flush(vec![LogRecord::new(Level::Error, "db down")]).await;
//! }
//! ```

mod batch;
mod exporter;
pub mod keys;
mod retention;

pub use batch::{Level, LogBatch, LogRecord};
pub use exporter::{ExportOutcome, LogExporter, LogSink};
pub use retention::{RetentionSweeper, SweepReport};

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::storage::StorageClient;

/// Build an exporter for a loaded configuration.
///
/// Returns `None` when export is disabled, the configuration does not
/// validate, or the storage client cannot be built. No export is ever
/// attempted against an invalid configuration.
pub fn activate(config: &Config) -> Option<LogExporter> {
    if !config.export.enabled {
        info!("Log export disabled");
        return None;
    }

    if let Err(e) = config.validate() {
        warn!(error = %e, "Log export not activated: invalid configuration");
        return None;
    }

    let storage = match StorageClient::from_config(&config.storage) {
        Ok(storage) => storage,
        Err(e) => {
            warn!(error = %e, "Log export not activated: storage client unavailable");
            return None;
        }
    };

    info!(
        bucket = %storage.bucket,
        directory = %config.export.directory,
        retention_days = config.export.retention_days,
        rotate_at = %config.export.rotate_at_bytes,
        "Log export activated"
    );

    Some(LogExporter::from_config(&config.export, Arc::new(storage)))
}
