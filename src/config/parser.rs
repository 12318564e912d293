use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Reads, parses and validates the configuration file at `path`
///
/// Keys missing from optional sections take their defaults; a missing
/// `[worker]` or `[storage]` section is a parse error.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use crawlet::config::load_config;
///
/// let config = load_config(Path::new("crawlet.toml")).unwrap();
/// println!("Database: {}", config.storage.database_path);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Loads the configuration together with the hex SHA-256 digest of the bytes parsed
///
/// The digest is logged at startup so runs from different config files can be
/// told apart.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
