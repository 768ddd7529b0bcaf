use url::Url;

/// Extracts the origin (scheme, host and port) of a URL
///
/// Default ports are omitted and the host is lowercase, so two URLs share
/// an origin exactly when their serialized origins are equal. Returns
/// `None` for URLs without a tuple origin (e.g. `data:` or `file:`).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_harvest::url::extract_origin;
///
/// let url = Url::parse("https://EXAMPLE.COM:443/path").unwrap();
/// assert_eq!(extract_origin(&url), Some("https://example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_origin(&url), Some("http://127.0.0.1:8080".to_string()));
/// ```
pub fn extract_origin(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}
