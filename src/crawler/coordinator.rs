//! Harvest coordinator - runs every site and flushes the report
//!
//! This module contains the top-level orchestration of a run:
//! - Building the shared HTTP client and retry policy
//! - Running one site orchestrator per site on a bounded pool
//! - Containing a failing or panicking site so siblings keep running
//! - Flushing the accumulated report to every sink once, at the end

use crate::config::Config;
use crate::crawler::fetcher::HttpClient;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::site::SiteOrchestrator;
use crate::output::{sinks_from_config, ReportSink, RunReport, RunStats, SiteSummary};
use crate::state::DownloadLedger;
use crate::url::Site;
use crate::HarvestError;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    sites: Vec<Site>,
    client: Arc<HttpClient>,
    extractor: Arc<dyn LinkExtractor>,
    ledger: DownloadLedger,
    stats: Arc<RunStats>,
    sinks: Vec<Box<dyn ReportSink>>,
    config_hash: String,
    peak_sites_in_flight: Arc<AtomicUsize>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `sites` - The sites to crawl, in report order
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config, sites: Vec<Site>) -> Result<Self, HarvestError> {
        let policy = RetryPolicy::from_config(&config.retry);
        let client = HttpClient::new(&config.http, policy)?;

        Ok(Self {
            config: Arc::new(config),
            sites,
            client: Arc::new(client),
            extractor: Arc::new(HtmlLinkExtractor),
            ledger: DownloadLedger::new(),
            stats: Arc::new(RunStats::new()),
            sinks: Vec::new(),
            config_hash: String::new(),
            peak_sites_in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Sets the configuration hash recorded with the report
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Replaces the default HTML link extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Adds a sink that receives the report once every site has finished
    pub fn add_sink(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    /// The ledger download records are appended to
    pub fn ledger(&self) -> &DownloadLedger {
        &self.ledger
    }

    /// Live counters of the run
    pub fn stats(&self) -> Arc<RunStats> {
        self.stats.clone()
    }

    /// Highest number of sites observed running at the same time
    pub fn peak_sites_in_flight(&self) -> usize {
        self.peak_sites_in_flight.load(Ordering::SeqCst)
    }

    /// Runs every site, then writes the report to each sink
    ///
    /// Sites run concurrently up to `max-concurrent-sites`. A site that fails
    /// as a whole (including by panicking) is recorded in its summary and
    /// does not affect other sites.
    ///
    /// # Errors
    ///
    /// Returns an error only if a report sink fails; every sink is still
    /// attempted before the first sink error is returned.
    pub async fn run(&mut self) -> Result<RunReport, HarvestError> {
        let started_at = Utc::now();
        let max_sites = self.config.coordinator.max_concurrent_sites.max(1) as usize;

        tracing::info!(
            sites = self.sites.len(),
            max_concurrent_sites = max_sites,
            max_concurrent_downloads = self.config.download.max_concurrent_downloads,
            "Starting harvest"
        );

        let orchestrator = Arc::new(SiteOrchestrator::new(
            self.client.clone(),
            self.extractor.clone(),
            self.config.crawler.clone(),
            PathBuf::from(&self.config.download.destination),
            self.config.download.max_concurrent_downloads as usize,
            self.stats.clone(),
        ));

        let semaphore = Arc::new(Semaphore::new(max_sites));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();
        let mut summaries: Vec<Option<SiteSummary>> = vec![None; self.sites.len()];

        for (index, site) in self.sites.iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    summaries[index] = Some(SiteSummary::failed(site, e.to_string()));
                    continue;
                }
            };

            let orchestrator = orchestrator.clone();
            let ledger = self.ledger.clone();
            let site = site.clone();
            let in_flight = in_flight.clone();
            let peak = self.peak_sites_in_flight.clone();

            tasks.spawn(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                let summary = run_site_isolated(orchestrator, site, ledger).await;

                in_flight.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
                (index, summary)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, summary)) => {
                    self.stats.record_site(summary.is_success());
                    summaries[index] = Some(summary);
                }
                Err(e) => {
                    // run_site_isolated never panics; only cancellation lands here
                    tracing::error!(error = %e, "Site task aborted");
                }
            }
        }

        let sites: Vec<SiteSummary> = summaries
            .into_iter()
            .zip(&self.sites)
            .map(|(summary, site)| {
                summary.unwrap_or_else(|| SiteSummary::failed(site, "site task aborted"))
            })
            .collect();

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            config_hash: self.config_hash.clone(),
            sites,
            records: self.ledger.snapshot(),
            stats: self.stats.snapshot(),
        };

        tracing::info!(
            sites = report.sites.len(),
            pages = report.stats.pages_visited,
            pdf_links = report.stats.pdf_links_found,
            downloaded = report.stats.downloads_succeeded,
            failed = report.stats.downloads_failed,
            peak_sites = self.peak_sites_in_flight(),
            "Harvest complete"
        );

        self.flush(&report)?;

        Ok(report)
    }

    /// Writes the report to every sink
    fn flush(&self, report: &RunReport) -> Result<(), HarvestError> {
        let mut first_error = None;

        for sink in &self.sinks {
            match sink.write_report(report) {
                Ok(()) => tracing::info!(sink = sink.name(), "Report written"),
                Err(e) => {
                    tracing::error!(sink = sink.name(), error = %e, "Failed to write report");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Runs one site on its own task so a panic stays inside it
async fn run_site_isolated(
    orchestrator: Arc<SiteOrchestrator>,
    site: Site,
    ledger: DownloadLedger,
) -> SiteSummary {
    let task_site = site.clone();
    let handle = tokio::spawn(async move { orchestrator.run(&task_site, &ledger).await });

    let result = match handle.await {
        Ok(result) => result,
        Err(e) => Err(HarvestError::SiteAborted {
            site: site.entry_url().to_string(),
            message: e.to_string(),
        }),
    };

    match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(site = %site, error = %e, "Site failed");
            SiteSummary::failed(&site, e.to_string())
        }
    }
}

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Crawl every site and download the PDFs it links to
/// 3. Write the SQLite and markdown reports named in `[output]`
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `sites` - The resolved sites to crawl
/// * `config_hash` - Hash of the configuration file, stored with the run
pub async fn run_harvest(
    config: Config,
    sites: Vec<Site>,
    config_hash: String,
) -> Result<RunReport, HarvestError> {
    let sinks = sinks_from_config(&config.output);

    let mut coordinator = Coordinator::new(config, sites)?.with_config_hash(config_hash);
    for sink in sinks {
        coordinator.add_sink(sink);
    }

    coordinator.run().await
}
