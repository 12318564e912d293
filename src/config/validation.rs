use crate::config::types::{Config, CrawlerConfig, FetcherConfig, StorageConfig, WorkerConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_worker_config(&config.worker)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates worker pool configuration
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > 64 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 64, got {}",
            config.pool_size
        )));
    }

    if config.store_retry_max_ms < config.cooldown_ms {
        return Err(ConfigError::Validation(format!(
            "store_retry_max_ms ({}ms) must be >= cooldown_ms ({}ms)",
            config.store_retry_max_ms, config.cooldown_ms
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.task_deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "task_deadline_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
