use serde::Deserialize;

/// Main configuration structure for PDF-Harvest
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    pub output: OutputConfig,

    /// Site entry URLs given inline
    #[serde(default)]
    pub sites: Vec<String>,

    /// Optional text file listing one site entry URL per line
    #[serde(default)]
    pub sites_file: Option<String>,
}

/// Order in which the frontier hands out queued pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Most recently discovered page first (stack)
    #[default]
    DepthFirst,
    /// Oldest discovered page first (queue)
    BreadthFirst,
}

/// Crawl frontier behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Delay between consecutive page fetches within one site (milliseconds)
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Maximum number of pages fetched per site
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default)]
    pub traversal: TraversalOrder,
}

/// Request headers and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Accept header sent when fetching HTML pages
    #[serde(default = "default_page_accept")]
    pub page_accept: String,

    /// Accept header sent when fetching PDF documents
    #[serde(default = "default_pdf_accept")]
    pub pdf_accept: String,

    /// Whole-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Retry and backoff policy for recoverable failures
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay; retry `n` waits `backoff_factor_ms * 2^(n-1)`
    #[serde(default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Status codes that trigger a retry
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

/// Download scheduler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DownloadConfig {
    /// Folder the PDFs are written into
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Maximum concurrent downloads per site
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: u32,
}

/// Top-level coordinator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CoordinatorConfig {
    /// Maximum number of sites processed at the same time
    #[serde(default = "default_max_concurrent_sites")]
    pub max_concurrent_sites: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite report database
    pub database_path: String,

    /// Path to the markdown report
    pub summary_path: String,
}

fn default_politeness_delay_ms() -> u64 {
    1000
}

fn default_max_pages() -> u32 {
    10_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_page_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string()
}

fn default_pdf_accept() -> String {
    "application/pdf".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_factor_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    120_000
}

fn default_retry_statuses() -> Vec<u16> {
    vec![403, 500, 502, 503, 504]
}

fn default_destination() -> String {
    "pdf_download".to_string()
}

fn default_max_concurrent_downloads() -> u32 {
    20
}

fn default_max_concurrent_sites() -> u32 {
    50
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            politeness_delay_ms: default_politeness_delay_ms(),
            max_pages: default_max_pages(),
            traversal: TraversalOrder::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            page_accept: default_page_accept(),
            pdf_accept: default_pdf_accept(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_factor_ms: default_backoff_factor_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sites: default_max_concurrent_sites(),
        }
    }
}
