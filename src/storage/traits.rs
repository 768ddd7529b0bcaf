//! Storage traits and error types
//!
//! This module defines the trait interface for report storage backends and
//! associated error types.

use crate::output::SiteSummary;
use crate::state::DownloadRecord;
use crate::storage::{DownloadRow, RunRecord, RunTotals};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for report storage backends
///
/// A run is written once, after every site has finished, and read back
/// by the statistics view.
pub trait ReportStore {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `started_at` - RFC 3339 start timestamp
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, started_at: &str, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished and stores its totals
    fn complete_run(
        &mut self,
        run_id: i64,
        finished_at: &str,
        totals: &RunTotals,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Sites =====

    /// Stores the outcome of one site
    fn insert_site_summary(&mut self, run_id: i64, summary: &SiteSummary) -> StorageResult<()>;

    /// Gets the site outcomes of a run, in insertion order
    fn get_site_summaries(&self, run_id: i64) -> StorageResult<Vec<SiteSummary>>;

    // ===== Downloads =====

    /// Stores download records in one transaction
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn insert_downloads(&mut self, run_id: i64, records: &[DownloadRecord])
        -> StorageResult<usize>;

    /// Gets the download rows of a run, in insertion order
    fn get_downloads(&self, run_id: i64) -> StorageResult<Vec<DownloadRow>>;

    // ===== Statistics =====

    /// Counts downloads of a run with the given status (`success` or `failed`)
    fn count_downloads_by_status(&self, run_id: i64, status: &str) -> StorageResult<u64>;

    /// Successful downloads per website, most first
    fn successful_downloads_by_site(&self, run_id: i64) -> StorageResult<Vec<(String, u64)>>;
}
