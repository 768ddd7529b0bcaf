//! Crawler module for site traversal and PDF downloads
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with an explicit retry policy
//! - HTML parsing and link extraction
//! - Per-site traversal (the crawl frontier)
//! - Bounded concurrent downloads
//! - Per-site orchestration and overall run coordination

mod coordinator;
mod downloader;
mod fetcher;
mod frontier;
mod parser;
mod retry;
mod site;

pub use coordinator::{run_harvest, Coordinator};
pub use downloader::DownloadScheduler;
pub use fetcher::{build_http_client, FetchedBody, HttpClient};
pub use frontier::{classify_link, CrawlFrontier, CrawlResult, FrontierQueue, LinkClass};
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use retry::RetryPolicy;
pub use site::SiteOrchestrator;
