//! Allow-list and blacklist checks for discovered links

use url::Url;

/// Decides whether a discovered link should be followed
///
/// A link is followed when its host is allowed and its path does not end
/// with any blacklisted suffix. An empty `allow_domains` allows every host.
/// Hosts are compared exactly apart from ASCII case, so `www.a.com` does
/// not match `a.com` but `A.com` does.
/// Links that cannot be parsed are rejected.
///
/// Every rejection is reported as a `debug` event naming the URL.
///
/// # Examples
///
/// ```
/// use crawlet::url::is_allowed;
///
/// let allow = vec!["a.com".to_string()];
/// let blacklist = vec![".pdf".to_string()];
///
/// assert!(is_allowed("http://a.com/page", &allow, &blacklist));
/// assert!(!is_allowed("http://b.com/page", &allow, &blacklist));
/// assert!(!is_allowed("http://a.com/report.pdf", &allow, &blacklist));
/// assert!(is_allowed("http://b.com/anything", &[], &[]));
/// ```
pub fn is_allowed(url: &str, allow_domains: &[String], blacklist: &[String]) -> bool {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Rejected unparseable link {}: {}", url, e);
            return false;
        }
    };

    if !is_domain_allowed(parsed.host_str(), allow_domains) {
        tracing::debug!("Rejected link outside allowed domains: {}", url);
        return false;
    }

    if is_blacklisted(parsed.path(), blacklist) {
        tracing::debug!("Rejected blacklisted link: {}", url);
        return false;
    }

    true
}

/// Returns true if `host` is a member of `allow_domains`, or the list is empty
pub fn is_domain_allowed(host: Option<&str>, allow_domains: &[String]) -> bool {
    if allow_domains.is_empty() {
        return true;
    }

    match host {
        Some(host) => allow_domains
            .iter()
            .any(|domain| domain.eq_ignore_ascii_case(host)),
        None => false,
    }
}

/// Returns true if `path` ends with any blacklist entry, taken as a literal suffix
pub fn is_blacklisted(path: &str, blacklist: &[String]) -> bool {
    blacklist
        .iter()
        .filter(|suffix| !suffix.is_empty())
        .any(|suffix| path.ends_with(suffix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_host_not_in_allow_list_rejected() {
        let allow = list(&["a.com"]);
        assert!(!is_allowed("http://b.com/", &allow, &[]));
        assert!(is_allowed("http://a.com/", &allow, &[]));
    }

    #[test]
    fn test_allow_list_is_exact_match() {
        let allow = list(&["a.com"]);
        assert!(!is_allowed("http://www.a.com/", &allow, &[]));
        assert!(!is_allowed("http://a.com.evil.net/", &allow, &[]));
    }

    #[test]
    fn test_allow_list_ignores_case() {
        let allow = list(&["Example.COM"]);
        assert!(is_allowed("http://example.com/page", &allow, &[]));
        assert!(is_allowed("http://EXAMPLE.com/page", &allow, &[]));
        assert!(!is_allowed("http://www.example.com/page", &allow, &[]));
    }

    #[test]
    fn test_allow_list_ignores_port() {
        let allow = list(&["127.0.0.1"]);
        assert!(is_allowed("http://127.0.0.1:4000/page", &allow, &[]));
    }

    #[test]
    fn test_blacklisted_suffix_rejected_regardless_of_domain() {
        let blacklist = list(&[".pdf", ".zip"]);
        assert!(!is_allowed("http://a.com/file.pdf", &[], &blacklist));
        assert!(!is_allowed(
            "http://a.com/archive.zip",
            &list(&["a.com"]),
            &blacklist
        ));
        assert!(is_allowed("http://a.com/file.html", &[], &blacklist));
    }

    #[test]
    fn test_blacklist_checks_path_not_query() {
        let blacklist = list(&[".pdf"]);
        assert!(is_allowed("http://a.com/view?file=x.pdf", &[], &blacklist));
    }

    #[test]
    fn test_blacklist_is_literal_suffix() {
        let blacklist = list(&["pdf"]);
        assert!(!is_allowed("http://a.com/getpdf", &[], &blacklist));
    }

    #[test]
    fn test_empty_lists_accept_everything() {
        assert!(is_allowed("http://a.com/", &[], &[]));
        assert!(is_allowed("https://b.org/x/y.pdf", &[], &[]));
    }

    #[test]
    fn test_empty_blacklist_entry_ignored() {
        assert!(is_allowed("http://a.com/page", &[], &list(&[""])));
    }

    #[test]
    fn test_unparseable_url_rejected() {
        assert!(!is_allowed("::not a url::", &[], &[]));
    }

    #[test]
    fn test_hostless_url_with_allow_list() {
        assert!(!is_allowed("mailto:me@a.com", &list(&["a.com"]), &[]));
        assert!(is_allowed("mailto:me@a.com", &[], &[]));
    }
}
