use url::Url;

/// Turns a possibly-relative `href` into an absolute URL string
///
/// # Rules
///
/// 1. An `href` that already starts with a scheme (`https:`, `mailto:`, ...)
///    is returned unchanged
/// 2. An `href` starting with `/` is appended to `scheme://host` of the base
/// 3. Anything else is appended to `scheme://host/` plus the base's existing
///    path, joined with a single `/`
///
/// The result is not validated and dot segments are not collapsed, so
/// `/a/../b` and `/b` stay distinct strings. When the base itself cannot be
/// parsed the `href` is returned as is.
///
/// # Examples
///
/// ```
/// use crawlet::url::normalize_link;
///
/// assert_eq!(normalize_link("http://a.com/x", "/y"), "http://a.com/y");
/// assert_eq!(normalize_link("http://a.com/x", "http://b.com"), "http://b.com");
/// assert_eq!(normalize_link("http://a.com", "y"), "http://a.com/y");
/// assert_eq!(normalize_link("http://a.com/x", "y"), "http://a.com/x/y");
/// ```
pub fn normalize_link(base_url: &str, href: &str) -> String {
    if has_scheme(href) {
        return href.to_string();
    }

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Cannot resolve {} against base {}: {}", href, base_url, e);
            return href.to_string();
        }
    };

    let origin = origin_of(&base);

    if href.starts_with('/') {
        return format!("{}{}", origin, href);
    }

    let path = base.path().trim_matches('/');
    if path.is_empty() {
        format!("{}/{}", origin, href)
    } else {
        format!("{}/{}/{}", origin, path, href)
    }
}

/// Returns true if `href` begins with an RFC 3986 scheme followed by `:`
///
/// ```
/// use crawlet::url::has_scheme;
///
/// assert!(has_scheme("https://example.com"));
/// assert!(has_scheme("mailto:someone@example.com"));
/// assert!(!has_scheme("/about"));
/// assert!(!has_scheme("about.html"));
/// ```
pub fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Returns true if `url` parses as an absolute `http` or `https` URL
pub fn is_http_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Builds `scheme://host[:port]` for a parsed URL
fn origin_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_relative_href_replaces_path() {
        assert_eq!(normalize_link("http://a.com/x", "/y"), "http://a.com/y");
        assert_eq!(
            normalize_link("https://a.com/x/y/z?q=1", "/top"),
            "https://a.com/top"
        );
    }

    #[test]
    fn test_absolute_href_unchanged() {
        assert_eq!(normalize_link("http://a.com/x", "http://b.com"), "http://b.com");
        assert_eq!(
            normalize_link("http://a.com/x", "https://b.com/p?q=1#frag"),
            "https://b.com/p?q=1#frag"
        );
    }

    #[test]
    fn test_relative_href_on_bare_host() {
        assert_eq!(normalize_link("http://a.com", "y"), "http://a.com/y");
        assert_eq!(normalize_link("http://a.com/", "y"), "http://a.com/y");
    }

    #[test]
    fn test_relative_href_keeps_base_path() {
        assert_eq!(normalize_link("http://a.com/x", "y"), "http://a.com/x/y");
        assert_eq!(normalize_link("http://a.com/x/", "y"), "http://a.com/x/y");
        assert_eq!(
            normalize_link("http://a.com/docs/guide", "intro.html"),
            "http://a.com/docs/guide/intro.html"
        );
    }

    #[test]
    fn test_port_is_preserved() {
        assert_eq!(
            normalize_link("http://127.0.0.1:8080/index", "/next"),
            "http://127.0.0.1:8080/next"
        );
        assert_eq!(
            normalize_link("http://127.0.0.1:8080", "next"),
            "http://127.0.0.1:8080/next"
        );
    }

    #[test]
    fn test_dot_segments_are_not_collapsed() {
        assert_eq!(
            normalize_link("http://a.com/x", "../y"),
            "http://a.com/x/../y"
        );
    }

    #[test]
    fn test_non_http_schemes_pass_through() {
        assert_eq!(
            normalize_link("http://a.com/x", "mailto:me@a.com"),
            "mailto:me@a.com"
        );
        assert_eq!(
            normalize_link("http://a.com/x", "javascript:void(0)"),
            "javascript:void(0)"
        );
    }

    #[test]
    fn test_unparseable_base_returns_href() {
        assert_eq!(normalize_link("not a url", "page"), "page");
    }

    #[test]
    fn test_has_scheme_rejects_bad_tokens() {
        assert!(!has_scheme(""));
        assert!(!has_scheme(":nothing"));
        assert!(!has_scheme("1http://a.com"));
        assert!(!has_scheme("a b:c"));
        assert!(has_scheme("svn+ssh://host/repo"));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("http://a.com/"));
        assert!(is_http_url("https://a.com/x"));
        assert!(!is_http_url("mailto:me@a.com"));
        assert!(!is_http_url("ftp://a.com/file"));
        assert!(!is_http_url("/relative"));
    }
}
