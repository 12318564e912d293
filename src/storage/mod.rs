//! Storage module for persisting tasks and crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Task creation, lookup and listing
//! - The lease protocol (atomic claim of a pending task, completion)
//! - Bulk persistence of page records and crawl statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{lock_shared, SharedStorage, StorageError, StorageResult, TaskStore, UrlStore};

use crate::state::TaskState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status code recorded when a fetch fails below the HTTP layer
///
/// DNS errors, refused connections, TLS failures and timeouts all collapse
/// into this single value.
pub const FETCH_FAILURE_STATUS: u16 = 404;

/// A crawl task as stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub url: String,
    pub max_depth: u32,
    pub domains: Vec<String>,
    pub blacklist: Vec<String>,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
}

/// Parameters for submitting a new task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub url: String,
    pub max_depth: u32,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl NewTask {
    /// Creates a task submission with no domain or suffix restrictions
    pub fn new(url: impl Into<String>, max_depth: u32) -> Self {
        Self {
            url: url.into(),
            max_depth,
            domains: Vec::new(),
            blacklist: Vec::new(),
        }
    }

    /// Restricts link following to the given hosts
    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }

    /// Skips links whose path ends with one of the given suffixes
    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Checks the submission before it reaches the database
    pub fn validate(&self) -> StorageResult<()> {
        if self.max_depth < 1 {
            return Err(StorageError::InvalidTask(format!(
                "max_depth must be >= 1, got {}",
                self.max_depth
            )));
        }

        if !crate::url::is_http_url(&self.url) {
            return Err(StorageError::InvalidTask(format!(
                "root URL must be an absolute http(s) URL, got '{}'",
                self.url
            )));
        }

        Ok(())
    }
}

/// Filter for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    pub state: Option<TaskState>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            state: None,
            offset: 0,
            limit: 100,
        }
    }
}

/// The outcome of fetching one URL during a crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Database id, None until persisted
    pub id: Option<i64>,
    /// Final URL after redirects
    pub url: String,
    pub status_code: u16,
    /// Raw body length in bytes, only for HTML 200 responses
    pub content_size: Option<u64>,
    /// Document title, only for HTML 200 responses
    pub content_title: Option<String>,
    /// Absolute outgoing links, empty unless the page was HTML
    pub links: Vec<String>,
    pub task_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl PageRecord {
    /// A record carrying only a status code
    pub fn with_status(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            id: None,
            url: url.into(),
            status_code,
            content_size: None,
            content_title: None,
            links: Vec::new(),
            task_id: None,
            created_at: Utc::now(),
        }
    }

    /// A record for a fetch that never produced an HTTP response
    pub fn fetch_failure(url: impl Into<String>) -> Self {
        Self::with_status(url, FETCH_FAILURE_STATUS)
    }

    /// Returns true if the record counts as an error in statistics
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// Number of crawled URLs for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStats {
    pub domain: String,
    pub total_crawled_urls: u64,
}

/// Aggregate statistics over every persisted page record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_crawled_urls: u64,
    /// Records with a status code of 400 or above
    pub total_errors_during_crawling: u64,
    pub status_code_stats: BTreeMap<u16, u64>,
    /// Sorted by count, highest first
    pub domain_stats: Vec<DomainStats>,
}
