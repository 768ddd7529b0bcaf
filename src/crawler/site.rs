//! Site orchestrator - crawl then download, for one site

use crate::config::CrawlerConfig;
use crate::crawler::downloader::DownloadScheduler;
use crate::crawler::fetcher::HttpClient;
use crate::crawler::frontier::CrawlFrontier;
use crate::crawler::parser::LinkExtractor;
use crate::output::{RunStats, SiteSummary};
use crate::state::DownloadLedger;
use crate::url::Site;
use crate::HarvestError;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs the crawl phase and then the download phase of a single site
pub struct SiteOrchestrator {
    client: Arc<HttpClient>,
    extractor: Arc<dyn LinkExtractor>,
    crawler: CrawlerConfig,
    destination: PathBuf,
    max_concurrent_downloads: usize,
    stats: Arc<RunStats>,
}

impl SiteOrchestrator {
    pub fn new(
        client: Arc<HttpClient>,
        extractor: Arc<dyn LinkExtractor>,
        crawler: CrawlerConfig,
        destination: PathBuf,
        max_concurrent_downloads: usize,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            client,
            extractor,
            crawler,
            destination,
            max_concurrent_downloads,
            stats,
        }
    }

    /// Crawls `site`, then downloads every PDF link it found
    ///
    /// A site without PDF links skips the download phase entirely, so the
    /// destination folder is not even created for it.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Filesystem` if the destination folder cannot
    /// be created. Page and download failures are absorbed into the summary.
    pub async fn run(
        &self,
        site: &Site,
        ledger: &DownloadLedger,
    ) -> Result<SiteSummary, HarvestError> {
        tracing::info!(site = %site, "Crawling {}", site);

        let frontier = CrawlFrontier::new(
            self.client.clone(),
            self.extractor.clone(),
            self.crawler.clone(),
            self.stats.clone(),
        );
        let crawl = frontier.crawl(site).await;

        let mut summary = SiteSummary::new(site);
        summary.pages_visited = crawl.visited.len() as u64;
        summary.pages_failed = crawl.pages_failed as u64;
        summary.pdf_links_found = crawl.pdf_links.len() as u64;
        summary.page_limit_reached = crawl.hit_page_limit();

        if crawl.pdf_links.is_empty() {
            tracing::info!(site = %site, "No PDF links found on {}, skipping downloads", site);
            return Ok(summary);
        }

        let scheduler = DownloadScheduler::new(
            self.client.clone(),
            self.max_concurrent_downloads,
            self.stats.clone(),
        );
        tracing::info!(
            site = %site,
            pdfs = crawl.pdf_links.len(),
            max_concurrent = scheduler.max_concurrent(),
            "Downloading {} PDFs from {}",
            crawl.pdf_links.len(),
            site
        );
        let records = scheduler
            .download_all(site, &crawl.pdf_links, &self.destination, ledger)
            .await?;

        let succeeded = records.iter().filter(|r| r.is_success()).count() as u64;
        summary.downloads_succeeded = succeeded;
        summary.downloads_failed = records.len() as u64 - succeeded;
        summary.peak_downloads_in_flight = scheduler.peak_in_flight() as u64;

        Ok(summary)
    }
}
