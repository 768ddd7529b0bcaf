//! Storage module for persisting run reports
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Run tracking with the configuration hash and totals
//! - Per-site outcomes and per-download provenance rows

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ReportStore, StorageError, StorageResult};

use std::path::Path;

/// Opens or creates a report database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened storage
/// * `Err(StorageError)` - Failed to open or initialize the database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// Represents a run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub sites: u64,
    pub pages_visited: u64,
    pub pages_failed: u64,
    pub pdf_links_found: u64,
}

/// Totals stored when a run completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub sites: u64,
    pub pages_visited: u64,
    pub pages_failed: u64,
    pub pdf_links_found: u64,
}

/// Represents a download row in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRow {
    pub id: i64,
    pub run_id: i64,
    pub website: String,
    pub pdf_link: String,
    pub pdf_file_name: String,
    pub status: String,
    pub error: Option<String>,
    pub bytes: Option<u64>,
    pub completed_at: String,
}

impl DownloadRow {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
