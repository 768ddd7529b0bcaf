//! SQLite-based report sink
//!
//! This module provides a report sink that persists a finished run to the
//! SQLite report store: one run row, one row per site and one per download.

use crate::output::traits::{OutputError, OutputResult, ReportSink, RunReport};
use crate::storage::{ReportStore, RunTotals, SqliteStore};
use std::path::{Path, PathBuf};

/// SQLite-based report sink
///
/// The database is opened when the report is written, so a sink can be
/// created before the run without holding a connection for its duration.
pub struct SqliteReportSink {
    path: PathBuf,
}

impl SqliteReportSink {
    /// Creates a sink writing to the database at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for SqliteReportSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn write_report(&self, report: &RunReport) -> OutputResult<()> {
        let mut store =
            SqliteStore::new(&self.path).map_err(|e| OutputError::Storage(e.to_string()))?;
        let run_id = persist_report(&mut store, report)?;

        tracing::debug!(run_id, path = %self.path.display(), "Report stored");
        Ok(())
    }
}

/// Writes a report into any report store
///
/// # Returns
///
/// The ID of the stored run
pub fn persist_report(store: &mut dyn ReportStore, report: &RunReport) -> OutputResult<i64> {
    let storage_err = |e: crate::storage::StorageError| OutputError::Storage(e.to_string());

    let run_id = store
        .create_run(&report.started_at.to_rfc3339(), &report.config_hash)
        .map_err(storage_err)?;

    for summary in &report.sites {
        store
            .insert_site_summary(run_id, summary)
            .map_err(storage_err)?;
    }

    store
        .insert_downloads(run_id, &report.records)
        .map_err(storage_err)?;

    let totals = RunTotals {
        sites: report.sites.len() as u64,
        pages_visited: report.stats.pages_visited,
        pages_failed: report.stats.pages_failed,
        pdf_links_found: report.stats.pdf_links_found,
    };
    store
        .complete_run(run_id, &report.finished_at.to_rfc3339(), &totals)
        .map_err(storage_err)?;

    Ok(run_id)
}
