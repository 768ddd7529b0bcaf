//! Download scheduler - bounded concurrent PDF downloads
//!
//! This module handles:
//! - Creating the destination folder
//! - Fanning out one download task per PDF link, bounded by a semaphore
//! - Writing each body to a temporary file and renaming it into place
//! - Turning per-download failures into failed records without touching siblings
//! - Appending every record to the shared ledger

use crate::crawler::fetcher::HttpClient;
use crate::output::RunStats;
use crate::state::{DownloadLedger, DownloadOutcome, DownloadRecord};
use crate::url::{pdf_file_name, Site};
use crate::HarvestError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Distinguishes temporary files of concurrent writers across the whole process
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Downloads PDF links with a fixed upper bound on concurrency
///
/// One scheduler serves one site: its semaphore bounds the downloads of
/// that site independently of how many sites run at the same time.
pub struct DownloadScheduler {
    client: Arc<HttpClient>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    stats: Arc<RunStats>,
}

impl DownloadScheduler {
    /// Creates a scheduler allowing `max_concurrent` downloads at once
    pub fn new(client: Arc<HttpClient>, max_concurrent: usize, stats: Arc<RunStats>) -> Self {
        let max_concurrent = max_concurrent.max(1);

        Self {
            client,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            stats,
        }
    }

    /// The configured concurrency bound
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Highest number of downloads observed in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Downloads every link into `destination` and waits for all of them
    ///
    /// Every link yields exactly one record, also appended to `ledger`.
    /// Duplicate links are downloaded again and overwrite the same file.
    ///
    /// # Errors
    ///
    /// Only a destination folder that cannot be created fails the call;
    /// individual download failures become failed records.
    pub async fn download_all(
        &self,
        site: &Site,
        pdf_links: &[Url],
        destination: &Path,
        ledger: &DownloadLedger,
    ) -> Result<Vec<DownloadRecord>, HarvestError> {
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|source| HarvestError::Filesystem {
                path: destination.to_path_buf(),
                source,
            })?;

        let mut tasks = JoinSet::new();

        for url in pdf_links {
            // Acquire before spawning so at most `max_concurrent` tasks exist
            let permit = self.semaphore.clone().acquire_owned().await.map_err(|e| {
                HarvestError::SiteAborted {
                    site: site.entry_url().to_string(),
                    message: format!("download pool closed: {}", e),
                }
            })?;

            let job = DownloadJob {
                client: self.client.clone(),
                site: site.clone(),
                url: url.clone(),
                destination: destination.to_path_buf(),
                in_flight: self.in_flight.clone(),
                peak_in_flight: self.peak_in_flight.clone(),
            };
            let stats = self.stats.clone();
            let ledger = ledger.clone();

            tasks.spawn(async move {
                let record = job.run().await;
                drop(permit);

                stats.record_download(record.is_success());
                ledger.append(record.clone());
                record
            });
        }

        let mut records = Vec::with_capacity(pdf_links.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!(site = %site, error = %e, "Download task aborted");
                }
            }
        }

        let succeeded = records.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            site = %site,
            succeeded,
            failed = records.len() - succeeded,
            "Finished downloads for {}",
            site
        );

        Ok(records)
    }
}

/// Everything one download task needs, owned so it can be spawned
struct DownloadJob {
    client: Arc<HttpClient>,
    site: Site,
    url: Url,
    destination: PathBuf,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl DownloadJob {
    async fn run(self) -> DownloadRecord {
        let file_name = pdf_file_name(&self.url);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.fetch_and_store(&file_name).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let outcome = match result {
            Ok(bytes) => {
                tracing::info!(
                    site = %self.site,
                    url = %self.url,
                    file = %file_name,
                    bytes,
                    "Downloaded: {}",
                    file_name
                );
                DownloadOutcome::Success { bytes }
            }
            Err(e) => {
                tracing::error!(
                    site = %self.site,
                    url = %self.url,
                    error = %e,
                    "Error downloading {}",
                    self.url
                );
                DownloadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        DownloadRecord {
            site: self.site.entry_url().to_string(),
            site_origin: self.site.origin().to_string(),
            pdf_url: self.url.to_string(),
            file_name,
            outcome,
            completed_at: Utc::now(),
        }
    }

    async fn fetch_and_store(&self, file_name: &str) -> Result<u64, HarvestError> {
        let fetched = self
            .client
            .fetch_pdf(&self.url, self.site.entry_url())
            .await?;

        let final_path = self.destination.join(file_name);
        // Fixed-length temp name; the final name may already be near NAME_MAX
        let temp_path = self.destination.join(format!(
            ".pdf-harvest-{}-{}.part",
            std::process::id(),
            TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(source) = tokio::fs::write(&temp_path, &fetched.body).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(HarvestError::Filesystem {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&temp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(HarvestError::Filesystem {
                path: final_path,
                source,
            });
        }

        Ok(fetched.body.len() as u64)
    }
}
