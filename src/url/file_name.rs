use url::Url;

/// Name used when a URL has no usable final path segment
pub const FALLBACK_FILE_NAME: &str = "download.pdf";

/// Derives the saved file name for a PDF URL
///
/// Takes the final non-empty path segment as it appears in the URL.
/// Different URLs sharing a final segment map to the same name.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_harvest::url::pdf_file_name;
///
/// let url = Url::parse("https://example.com/files/q3-results.pdf?download=1").unwrap();
/// assert_eq!(pdf_file_name(&url), "q3-results.pdf");
/// ```
pub fn pdf_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|name| *name != "." && *name != "..")
        .map(|name| name.replace('\\', "_"))
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}
