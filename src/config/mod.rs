//! Configuration module for PDF-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving the list of sites to crawl.
//!
//! # Example
//!
//! ```no_run
//! use pdf_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Downloading into: {}", config.download.destination);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CoordinatorConfig, CrawlerConfig, DownloadConfig, HttpConfig, OutputConfig,
    RetryConfig, TraversalOrder,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config};
pub use validation::validate;

use crate::url::{parse_site_list, Site};
use crate::ConfigError;
use std::path::Path;

impl Config {
    /// Resolves every configured site into a [`Site`]
    ///
    /// Inline `sites` come first, followed by the entries of `sites-file`
    /// in file order. Duplicate entry URLs are kept only once.
    pub fn resolve_sites(&self) -> Result<Vec<Site>, ConfigError> {
        let mut urls = self.sites.clone();

        if let Some(sites_file) = &self.sites_file {
            let content = std::fs::read_to_string(Path::new(sites_file))?;
            urls.extend(parse_site_list(&content));
        }

        let mut sites: Vec<Site> = Vec::with_capacity(urls.len());
        for url in &urls {
            let site = Site::parse(url).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", url, e))
            })?;
            if !sites.iter().any(|s| s.entry_url() == site.entry_url()) {
                sites.push(site);
            }
        }

        if sites.is_empty() {
            return Err(ConfigError::Validation(
                "at least one site must be configured via `sites` or `sites-file`".to_string(),
            ));
        }

        Ok(sites)
    }
}
