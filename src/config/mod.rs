//! Configuration module for Crawlet
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawlet::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawlet.toml")).unwrap();
//! println!("Starting {} workers", config.worker.pool_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetcherConfig, StorageConfig, WorkerConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash, parse_config};
