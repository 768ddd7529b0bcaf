//! URL handling module for PDF-Harvest
//!
//! This module provides site and origin handling, PDF target classification,
//! saved-file-name derivation and site list parsing.

mod file_name;
mod origin;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use file_name::{pdf_file_name, FALLBACK_FILE_NAME};
pub use origin::extract_origin;

/// A site to crawl: its entry point and the origin that bounds the crawl
///
/// Immutable for the duration of a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    entry: Url,
    origin: String,
}

impl Site {
    /// Parses an entry URL into a site
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_harvest::url::Site;
    ///
    /// let site = Site::parse("https://Example.com:8443/overview/default.aspx").unwrap();
    /// assert_eq!(site.origin(), "https://example.com:8443");
    /// ```
    pub fn parse(entry_url: &str) -> Result<Self, UrlError> {
        let entry = Url::parse(entry_url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if entry.scheme() != "http" && entry.scheme() != "https" {
            return Err(UrlError::InvalidScheme(entry.scheme().to_string()));
        }

        let origin =
            extract_origin(&entry).ok_or_else(|| UrlError::MissingHost(entry.to_string()))?;

        Ok(Self { entry, origin })
    }

    /// The entry point URL
    pub fn entry(&self) -> &Url {
        &self.entry
    }

    /// The entry point URL as a string
    pub fn entry_url(&self) -> &str {
        self.entry.as_str()
    }

    /// Scheme, host and port of the entry URL
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns true if `url` shares this site's origin
    pub fn contains(&self, url: &Url) -> bool {
        extract_origin(url).as_deref() == Some(self.origin.as_str())
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entry.as_str())
    }
}

/// Returns true if the URL's path ends in `.pdf` (ASCII case-insensitive)
///
/// The query string and fragment are ignored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_harvest::url::is_pdf_link;
///
/// assert!(is_pdf_link(&Url::parse("https://example.com/files/Q3.PDF?v=2").unwrap()));
/// assert!(!is_pdf_link(&Url::parse("https://example.com/view?file=q3.pdf").unwrap()));
/// ```
pub fn is_pdf_link(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

/// Parses a site list with one entry URL per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_site_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
