//! Run statistics
//!
//! This module provides the live counters shared by every crawl and download
//! task, and the functions that load and display statistics of a finished run
//! from the report database.

use crate::output::OutputError;
use crate::storage::{ReportStore, RunRecord};
use crate::HarvestError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated concurrently by site and download tasks
#[derive(Debug, Default)]
pub struct RunStats {
    pages_visited: AtomicU64,
    pages_failed: AtomicU64,
    pdf_links_found: AtomicU64,
    downloads_succeeded: AtomicU64,
    downloads_failed: AtomicU64,
    sites_completed: AtomicU64,
    sites_failed: AtomicU64,
}

/// Point-in-time copy of [`RunStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_visited: u64,
    pub pages_failed: u64,
    pub pdf_links_found: u64,
    pub downloads_succeeded: u64,
    pub downloads_failed: u64,
    pub sites_completed: u64,
    pub sites_failed: u64,
}

impl RunStats {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page_visited(&self) {
        self.pages_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pdf_link(&self) {
        self.pdf_links_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a finished download attempt
    pub fn record_download(&self, success: bool) {
        let counter = if success {
            &self.downloads_succeeded
        } else {
            &self.downloads_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a finished site
    pub fn record_site(&self, success: bool) {
        let counter = if success {
            &self.sites_completed
        } else {
            &self.sites_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_visited: self.pages_visited.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            pdf_links_found: self.pdf_links_found.load(Ordering::Relaxed),
            downloads_succeeded: self.downloads_succeeded.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            sites_completed: self.sites_completed.load(Ordering::Relaxed),
            sites_failed: self.sites_failed.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Total download attempts
    pub fn downloads_attempted(&self) -> u64 {
        self.downloads_succeeded + self.downloads_failed
    }

    /// Download success rate as a percentage
    pub fn download_success_rate(&self) -> f64 {
        let attempted = self.downloads_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.downloads_succeeded as f64 / attempted as f64) * 100.0
    }
}

/// Statistics of a stored run
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    pub run: RunRecord,

    /// Download rows stored for the run
    pub total_downloads: u64,

    pub successful_downloads: u64,

    pub failed_downloads: u64,

    /// (site, successful downloads) ordered by count, descending
    pub downloads_by_site: Vec<(String, u64)>,
}

/// Loads statistics of the latest run from storage
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - No run stored, or the query failed
pub fn load_statistics(store: &dyn ReportStore) -> Result<HarvestStatistics, HarvestError> {
    let run = store
        .get_latest_run()?
        .ok_or_else(|| {
            HarvestError::Output(OutputError::Storage("No runs found in database".to_string()))
        })?;

    let successful_downloads = store.count_downloads_by_status(run.id, "success")?;
    let failed_downloads = store.count_downloads_by_status(run.id, "failed")?;
    let downloads_by_site = store.successful_downloads_by_site(run.id)?;

    Ok(HarvestStatistics {
        total_downloads: successful_downloads + failed_downloads,
        successful_downloads,
        failed_downloads,
        downloads_by_site,
        run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Run {}:", stats.run.id);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Config hash: {}", stats.run.config_hash);
    println!();

    println!("Crawl:");
    println!("  Sites: {}", stats.run.sites);
    println!("  Pages visited: {}", stats.run.pages_visited);
    println!("  Pages failed: {}", stats.run.pages_failed);
    println!("  PDF links found: {}", stats.run.pdf_links_found);
    println!();

    println!("Downloads:");
    println!("  Total: {}", stats.total_downloads);
    println!("  Succeeded: {}", stats.successful_downloads);
    println!("  Failed: {}", stats.failed_downloads);
    println!();

    if !stats.downloads_by_site.is_empty() {
        println!("Downloads by Site:");
        for (site, count) in &stats.downloads_by_site {
            println!("  {}: {}", site, count);
        }
        println!();
    }

    let success_rate = if stats.total_downloads > 0 {
        (stats.successful_downloads as f64 / stats.total_downloads as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} downloads)",
        success_rate, stats.successful_downloads, stats.total_downloads
    );
}
