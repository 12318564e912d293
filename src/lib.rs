//! Crawlet: a breadth-first web crawler driven by a shared task queue
//!
//! Crawl tasks are stored in SQLite. A pool of workers leases pending tasks one
//! at a time, walks the link graph from each task's root URL up to its depth
//! limit, and persists the metadata of every visited page.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;
pub mod worker;

use thiserror::Error;

/// Main error type for Crawlet operations
#[derive(Debug, Error)]
pub enum CrawletError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Crawlet operations
pub type Result<T> = std::result::Result<T, CrawletError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlLimits, CrawlRequest, Fetcher, HttpFetcher};
pub use state::TaskState;
pub use storage::{NewTask, PageRecord, SqliteStorage, Stats, Task, TaskStore, UrlStore};
pub use url::{is_allowed, normalize_link};
pub use worker::{Worker, WorkerPool};
