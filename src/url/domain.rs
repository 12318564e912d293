use url::Url;

/// Extracts the host from a URL string
///
/// The host is returned as the URL parser reports it (lowercased for domain
/// names) and without the port. Returns None when the string does not parse
/// or has no host, as with `mailto:` links.
///
/// # Examples
///
/// ```
/// use crawlet::url::extract_domain;
///
/// assert_eq!(extract_domain("https://Example.com:8080/a"), Some("example.com".to_string()));
/// assert_eq!(extract_domain("mailto:someone@example.com"), None);
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}
