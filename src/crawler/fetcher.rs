//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests that follow redirects
//! - Folding every outcome, failures included, into a [`PageRecord`]

use crate::config::FetcherConfig;
use crate::crawler::parser::parse_html;
use crate::storage::PageRecord;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;

/// Source of page records for the traversal engine
///
/// Implementations must never fail: transport errors, non-200 responses and
/// unparseable bodies all come back as a record whose fields describe the
/// outcome.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one URL and describes the result
    async fn fetch(&self, url: &str) -> PageRecord;
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with a fresh client from the configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> PageRecord {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use crawlet::config::FetcherConfig;
/// use crawlet::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value names an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..9)
        .map(|prefix| prefix.eq_ignore_ascii_case("text/html"))
        .unwrap_or(false)
}

/// Fetches a URL and classifies the response
///
/// # Outcomes
///
/// | Condition | Record |
/// |-----------|--------|
/// | DNS, connect, TLS or timeout error | failure sentinel status, requested URL |
/// | Status other than 200 | real status, final URL |
/// | 200, not HTML | status 200, no size, no title, no links |
/// | 200, HTML | size in bytes, title, normalized links |
///
/// Redirects are followed by the client, so the record URL is the final one.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> PageRecord {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else if e.is_redirect() {
                "redirect"
            } else {
                "request"
            };
            tracing::debug!("Fetch of {} failed ({}): {}", url, kind, e);
            return PageRecord::fetch_failure(url);
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status != StatusCode::OK {
        tracing::debug!("Fetched {} -> HTTP {}", final_url, status.as_u16());
        return PageRecord::with_status(final_url, status.as_u16());
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        tracing::debug!("Fetched {} -> non-HTML content ({})", final_url, content_type);
        return PageRecord::with_status(final_url, status.as_u16());
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Reading body of {} failed: {}", final_url, e);
            return PageRecord::fetch_failure(final_url);
        }
    };

    let parsed = parse_html(&String::from_utf8_lossy(&body), &final_url);
    tracing::debug!(
        "Fetched {} -> HTTP 200, {} bytes, {} links",
        final_url,
        body.len(),
        parsed.links.len()
    );

    let mut record = PageRecord::with_status(final_url, status.as_u16());
    record.content_size = Some(body.len() as u64);
    record.content_title = Some(parsed.title);
    record.links = parsed.links;
    record
}
