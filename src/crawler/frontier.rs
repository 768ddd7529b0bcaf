//! Crawl frontier - per-site page traversal
//!
//! This module handles:
//! - The frontier queue of pages waiting to be visited
//! - The visited set that guarantees each page is fetched at most once per site
//! - Classifying discovered links as PDF targets, in-scope pages, or out of scope
//! - Politeness pacing between consecutive page fetches
//! - A page ceiling that bounds traversal of pathological sites
//!
//! Traversal within one site is strictly sequential. The queue and visited set
//! are owned by a single `crawl` call and never shared.

use crate::config::{CrawlerConfig, TraversalOrder};
use crate::crawler::fetcher::HttpClient;
use crate::crawler::parser::LinkExtractor;
use crate::output::RunStats;
use crate::url::{is_pdf_link, Site};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How a discovered link is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Path ends in `.pdf`; collected for download, never traversed
    PdfTarget,
    /// Same origin as the site; queued for a visit
    Page,
    /// Different origin; dropped
    OutOfScope,
}

/// Classifies a discovered link relative to a site
pub fn classify_link(site: &Site, url: &Url) -> LinkClass {
    if is_pdf_link(url) {
        LinkClass::PdfTarget
    } else if site.contains(url) {
        LinkClass::Page
    } else {
        LinkClass::OutOfScope
    }
}

/// Pending pages plus the set of pages already fetched
///
/// URL equality is exact string equality; no canonicalization is applied.
#[derive(Debug)]
pub struct FrontierQueue {
    queue: VecDeque<Url>,
    visited: HashSet<String>,
    order: TraversalOrder,
}

impl FrontierQueue {
    /// Creates a frontier seeded with the entry URL
    pub fn new(entry: Url, order: TraversalOrder) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(entry);

        Self {
            queue,
            visited: HashSet::new(),
            order,
        }
    }

    /// Takes the next URL to consider
    ///
    /// Depth-first pops the most recently pushed URL, breadth-first the oldest.
    pub fn pop(&mut self) -> Option<Url> {
        match self.order {
            TraversalOrder::DepthFirst => self.queue.pop_back(),
            TraversalOrder::BreadthFirst => self.queue.pop_front(),
        }
    }

    /// Queues a URL for a later visit
    pub fn push(&mut self, url: Url) {
        self.queue.push_back(url);
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Returns true if the URL has been visited
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Number of queued URLs (may include URLs visited since they were queued)
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Result of crawling one site
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// PDF links in discovery order; may contain duplicates
    pub pdf_links: Vec<Url>,

    /// Pages fetched, in fetch order
    pub visited: Vec<Url>,

    /// Pages whose fetch failed
    pub pages_failed: usize,

    /// URLs still queued when the page ceiling stopped the crawl
    pub pages_remaining: usize,
}

impl CrawlResult {
    /// Returns true if traversal stopped at the page ceiling
    pub fn hit_page_limit(&self) -> bool {
        self.pages_remaining > 0
    }
}

/// Drives the traversal of one site at a time
pub struct CrawlFrontier {
    client: Arc<HttpClient>,
    extractor: Arc<dyn LinkExtractor>,
    config: CrawlerConfig,
    stats: Arc<RunStats>,
}

impl CrawlFrontier {
    /// Creates a new crawl frontier
    pub fn new(
        client: Arc<HttpClient>,
        extractor: Arc<dyn LinkExtractor>,
        config: CrawlerConfig,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            client,
            extractor,
            config,
            stats,
        }
    }

    /// Crawls a site and returns the PDF links found on it
    ///
    /// # Algorithm
    ///
    /// 1. Seed the frontier with the entry URL
    /// 2. Pop a URL; skip it if already visited, otherwise mark it visited and fetch it
    /// 3. A failed fetch is logged and the crawl moves on
    /// 4. Every link found is either collected as a PDF, queued (same origin,
    ///    not yet visited), or dropped
    /// 5. Stop when the frontier is empty or the page ceiling is reached
    ///
    /// The politeness delay separates consecutive page fetches.
    pub async fn crawl(&self, site: &Site) -> CrawlResult {
        let mut frontier = FrontierQueue::new(site.entry().clone(), self.config.traversal);
        let mut result = CrawlResult::default();
        let delay = Duration::from_millis(self.config.politeness_delay_ms);
        let max_pages = self.config.max_pages as usize;

        tracing::debug!(site = %site, origin = site.origin(), "Starting traversal");

        while let Some(url) = frontier.pop() {
            if frontier.is_visited(&url) {
                tracing::trace!(url = %url, "Already visited, skipping");
                continue;
            }

            if result.visited.len() >= max_pages {
                result.pages_remaining = frontier.len() + 1;
                tracing::warn!(
                    site = %site,
                    max_pages,
                    remaining = result.pages_remaining,
                    "Page limit reached, stopping traversal"
                );
                break;
            }

            frontier.mark_visited(&url);
            if !result.visited.is_empty() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result.visited.push(url.clone());
            self.stats.record_page_visited();

            let page = match self.client.fetch_page(&url, site.entry_url()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(site = %site, url = %url, error = %e, "Error fetching page");
                    result.pages_failed += 1;
                    self.stats.record_page_failed();
                    continue;
                }
            };

            // A redirect lands on a different URL; don't fetch that one again
            if page.final_url != url && site.contains(&page.final_url) {
                frontier.mark_visited(&page.final_url);
            }

            // Relative links of a page that left the origin still belong to the site
            let base = if site.contains(&page.final_url) {
                &page.final_url
            } else {
                &url
            };

            let content = String::from_utf8_lossy(&page.body);
            let links = self.extractor.extract_links(&content, base);
            tracing::info!(url = %url, links = links.len(), "Found {} links on {}", links.len(), url);

            for link in links {
                match classify_link(site, &link) {
                    LinkClass::PdfTarget => {
                        tracing::debug!(url = %link, "Found PDF link");
                        self.stats.record_pdf_link();
                        result.pdf_links.push(link);
                    }
                    LinkClass::Page => {
                        if !frontier.is_visited(&link) {
                            frontier.push(link);
                        }
                    }
                    LinkClass::OutOfScope => {
                        tracing::trace!(url = %link, "Out of scope, ignoring");
                    }
                }
            }
        }

        tracing::info!(
            site = %site,
            pages = result.visited.len(),
            failed = result.pages_failed,
            pdfs = result.pdf_links.len(),
            "Found {} PDF links on {}",
            result.pdf_links.len(),
            site
        );

        result
    }
}
