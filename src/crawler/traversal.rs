//! Breadth-first crawl of a single task
//!
//! The traversal walks a FIFO frontier of `(url, depth)` pairs starting at the
//! root URL at depth 0. A URL is fetched at most once per run, pages at
//! `depth >= max_depth` are never fetched, and only links accepted by
//! [`is_allowed`] enter the frontier.

use crate::config::CrawlerConfig;
use crate::crawler::Fetcher;
use crate::storage::{PageRecord, Task};
use crate::url::{is_allowed, is_http_url};
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// What to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub root_url: String,
    pub max_depth: u32,
    pub allow_domains: Vec<String>,
    pub blacklist: Vec<String>,
}

impl From<&Task> for CrawlRequest {
    fn from(task: &Task) -> Self {
        Self {
            root_url: task.url.clone(),
            max_depth: task.max_depth,
            allow_domains: task.domains.clone(),
            blacklist: task.blacklist.clone(),
        }
    }
}

/// Safety valves on a single crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Stop after this many pages have been fetched
    pub max_pages: Option<usize>,

    /// Stop fetching once this much wall-clock time has passed
    pub deadline: Option<Duration>,
}

impl CrawlLimits {
    /// No limits beyond the depth bound
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            deadline: config.task_deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The frontier ran dry
    Exhausted,
    /// `max_pages` was reached
    PageLimit,
    /// The deadline passed
    Deadline,
    /// The shutdown signal was raised
    Cancelled,
}

/// Result of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Records in visitation order, no two sharing a URL
    pub pages: Vec<PageRecord>,
    pub stop_reason: StopReason,
}

/// Crawls `request` with no limits other than its depth bound
pub async fn crawl<F>(fetcher: &F, request: &CrawlRequest) -> Vec<PageRecord>
where
    F: Fetcher + ?Sized,
{
    crawl_with_limits(fetcher, request, &CrawlLimits::unbounded(), None)
        .await
        .pages
}

/// Crawls `request` breadth-first, honoring limits and an optional shutdown signal
///
/// # Algorithm
///
/// 1. Seed the frontier with `(root_url, 0)`
/// 2. Pop the front entry; skip it if the URL was already visited or its
///    depth reached `max_depth`
/// 3. Fetch it and mark both the queued URL and the final (post-redirect)
///    URL as visited
/// 4. If the final URL had already been recorded (a redirect onto a known
///    page) drop the new record; otherwise keep it and enqueue every allowed
///    link at `depth + 1`
///
/// Limits and the shutdown signal are checked before each fetch. Records
/// gathered before a stop are still returned.
pub async fn crawl_with_limits<F>(
    fetcher: &F,
    request: &CrawlRequest,
    limits: &CrawlLimits,
    shutdown: Option<&watch::Receiver<bool>>,
) -> CrawlOutcome
where
    F: Fetcher + ?Sized,
{
    let started = Instant::now();
    let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut pages: Vec<PageRecord> = Vec::new();
    let mut stop_reason = StopReason::Exhausted;

    frontier.push_back((request.root_url.clone(), 0));

    while let Some((url, depth)) = frontier.pop_front() {
        if depth >= request.max_depth || visited.contains(&url) {
            continue;
        }

        if shutdown.map(|rx| *rx.borrow()).unwrap_or(false) {
            stop_reason = StopReason::Cancelled;
            break;
        }

        if limits.max_pages.is_some_and(|max| pages.len() >= max) {
            stop_reason = StopReason::PageLimit;
            break;
        }

        if limits.deadline.is_some_and(|deadline| started.elapsed() >= deadline) {
            stop_reason = StopReason::Deadline;
            break;
        }

        let record = fetcher.fetch(&url).await;

        let redirected_onto_known = record.url != url && visited.contains(&record.url);
        visited.insert(record.url.clone());
        visited.insert(url);

        if redirected_onto_known {
            tracing::debug!("Dropping duplicate record for {}", record.url);
            continue;
        }

        // Links found at the last fetchable level would only be skipped on pop.
        if depth + 1 < request.max_depth {
            for link in &record.links {
                if !is_http_url(link) {
                    tracing::debug!("Not following non-HTTP link: {}", link);
                    continue;
                }
                if is_allowed(link, &request.allow_domains, &request.blacklist) {
                    frontier.push_back((link.clone(), depth + 1));
                }
            }
        }

        pages.push(record);
    }

    tracing::debug!(
        "Crawl of {} stopped ({:?}) after {} pages in {:?}",
        request.root_url,
        stop_reason,
        pages.len(),
        started.elapsed()
    );

    CrawlOutcome { pages, stop_reason }
}
