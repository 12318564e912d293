//! Crawler module for web page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching that folds every outcome into a page record
//! - HTML parsing and link extraction
//! - Breadth-first traversal bounded by depth, page count and deadline

mod fetcher;
mod parser;
mod traversal;

pub use fetcher::{build_http_client, fetch_url, is_html_content_type, Fetcher, HttpFetcher};
pub use parser::{parse_html, ParsedPage};
pub use traversal::{crawl, crawl_with_limits, CrawlLimits, CrawlOutcome, CrawlRequest, StopReason};
