use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are NOT applied; see [`resolve_config`].
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let (config, _) = parse_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
///
/// Returns the configuration and the fingerprint of the file content.
fn parse_config(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok((config, hash_content(&content)))
}

/// Builds the effective configuration for a run
///
/// Reads the optional TOML file (defaults otherwise), applies environment
/// overrides, then validates the result.
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - The configuration and, when a file was
///   read, the SHA-256 fingerprint of its content
/// * `Err(ConfigError)` - Failed to read, parse, override or validate
pub fn resolve_config(path: Option<&Path>) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, hash) = match path {
        Some(path) => {
            let (config, hash) = parse_config(path)?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok((config, hash))
}

/// Applies environment overrides to a configuration
///
/// Recognized variables: `START_PAGE`, `END_PAGE`, `STORIES_FILE`,
/// `GIT_USER_NAME`, `GIT_USER_EMAIL`, `GITHUB_TOKEN`, `GITHUB_REPOSITORY`,
/// `GIT_BRANCH`, `API_BASE_URL`, `API_KEY`. Blank values are ignored.
///
/// # Arguments
///
/// * `config` - The configuration to modify
/// * `lookup` - Variable lookup, `std::env::var` in production
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(value) = get("START_PAGE") {
        config.crawler.start_page = parse_page("START_PAGE", &value)?;
    }
    if let Some(value) = get("END_PAGE") {
        config.crawler.end_page = parse_page("END_PAGE", &value)?;
    }
    if let Some(value) = get("STORIES_FILE") {
        config.output.path = value;
    }
    if let Some(value) = get("GIT_USER_NAME") {
        config.publish.name = Some(value);
    }
    if let Some(value) = get("GIT_USER_EMAIL") {
        config.publish.email = Some(value);
    }
    if let Some(value) = get("GITHUB_TOKEN") {
        config.publish.token = Some(value);
    }
    if let Some(value) = get("GITHUB_REPOSITORY") {
        config.publish.repository = Some(value);
    }
    if let Some(value) = get("GIT_BRANCH") {
        config.publish.branch = value;
    }
    if let Some(value) = get("API_BASE_URL") {
        config.source.api_base = Some(value);
    }
    if let Some(value) = get("API_KEY") {
        config.source.api_key = Some(value);
    }

    Ok(())
}

fn parse_page(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|e| {
        ConfigError::Validation(format!("{} must be a positive integer, got '{}': {}", key, value, e))
    })
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
