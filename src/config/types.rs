use serde::Deserialize;

/// Main configuration structure for Crawlet
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub worker: WorkerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent worker loops
    #[serde(rename = "pool-size")]
    pub pool_size: u32,

    /// Upper bound of the random delay before each claim attempt (milliseconds)
    #[serde(rename = "jitter-max-ms", default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    /// Fixed idle time after each iteration (milliseconds)
    #[serde(rename = "cooldown-ms", default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Cap on the backoff applied after consecutive store failures (milliseconds)
    #[serde(rename = "store-retry-max-ms", default = "default_store_retry_max_ms")]
    pub store_retry_max_ms: u64,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Total timeout for a single GET request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Per-task crawl limits
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched for a single task
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Wall-clock budget for a single task (seconds)
    #[serde(rename = "task-deadline-secs")]
    pub task_deadline_secs: Option<u64>,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_jitter_max_ms() -> u64 {
    1000
}

fn default_cooldown_ms() -> u64 {
    1000
}

fn default_store_retry_max_ms() -> u64 {
    30_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("crawlet/{}", env!("CARGO_PKG_VERSION"))
}
