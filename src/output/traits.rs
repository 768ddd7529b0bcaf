//! Report sink traits and types
//!
//! This module defines the trait interface for report sinks and the
//! run report they receive once every site has finished.

use crate::output::StatsSnapshot;
use crate::state::DownloadRecord;
use crate::url::Site;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Outcome of one site's crawl and download phases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSummary {
    /// Entry URL of the site
    pub site: String,

    /// Origin the crawl was scoped to
    pub origin: String,

    pub pages_visited: u64,

    pub pages_failed: u64,

    /// PDF links found, duplicates included
    pub pdf_links_found: u64,

    pub downloads_succeeded: u64,

    pub downloads_failed: u64,

    /// Highest number of this site's downloads in flight at once
    pub peak_downloads_in_flight: u64,

    /// Traversal stopped at the page ceiling with pages still queued
    pub page_limit_reached: bool,

    /// Set when the site's orchestration failed as a whole
    pub error: Option<String>,
}

impl SiteSummary {
    /// Creates an empty summary for a site
    pub fn new(site: &Site) -> Self {
        Self {
            site: site.entry_url().to_string(),
            origin: site.origin().to_string(),
            ..Self::default()
        }
    }

    /// Creates the summary of a site whose orchestration failed
    pub fn failed(site: &Site, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(site)
        }
    }

    /// Returns true if the site ran to completion
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything known about a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration the run used
    pub config_hash: String,

    /// One summary per configured site, in configuration order
    pub sites: Vec<SiteSummary>,

    /// Every download attempt of the run, in completion order
    pub records: Vec<DownloadRecord>,

    pub stats: StatsSnapshot,
}

impl RunReport {
    /// Records of successful downloads
    pub fn successes(&self) -> impl Iterator<Item = &DownloadRecord> {
        self.records.iter().filter(|r| r.is_success())
    }

    /// Records of failed downloads
    pub fn failures(&self) -> impl Iterator<Item = &DownloadRecord> {
        self.records.iter().filter(|r| !r.is_success())
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Trait for report sinks
///
/// A sink receives the complete report exactly once, after every site
/// has finished. Implementations must be thread-safe.
pub trait ReportSink: Send + Sync {
    /// Human readable name used in log messages
    fn name(&self) -> &str;

    /// Persists the report
    fn write_report(&self, report: &RunReport) -> OutputResult<()>;
}
