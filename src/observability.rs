//! In-process export counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::export::{ExportOutcome, SweepReport};

/// Metrics handle shared by the exporter and the host
#[derive(Debug, Default)]
pub struct Metrics {
    created: AtomicU64,
    appended: AtomicU64,
    rotated: AtomicU64,
    recovered: AtomicU64,
    failed: AtomicU64,
    swept: AtomicU64,
    sweep_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&self, outcome: &ExportOutcome) {
        let (counter, name) = match outcome {
            ExportOutcome::Skipped => return,
            ExportOutcome::Created { .. } => (&self.created, "exports_created"),
            ExportOutcome::Appended { .. } => (&self.appended, "exports_appended"),
            ExportOutcome::Rotated { .. } => (&self.rotated, "exports_rotated"),
            ExportOutcome::Recovered { .. } => (&self.recovered, "exports_recovered"),
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = name, "Metric incremented");
    }

    pub fn export_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "exports_failed", "Metric incremented");
    }

    pub fn record_sweep(&self, report: &SweepReport) {
        self.swept.fetch_add(report.deleted as u64, Ordering::Relaxed);
        self.sweep_failures.fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    pub fn sweep_failed(&self) {
        self.sweep_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "sweep_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            appended: self.appended.load(Ordering::Relaxed),
            rotated: self.rotated.load(Ordering::Relaxed),
            recovered: self.recovered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            sweep_failures: self.sweep_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub created: u64,
    pub appended: u64,
    pub rotated: u64,
    pub recovered: u64,
    pub failed: u64,
    pub swept: u64,
    pub sweep_failures: u64,
}
