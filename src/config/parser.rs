use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses and validates a rule set file
///
/// The format is chosen by extension: `.json` or `.toml`.
///
/// # Arguments
///
/// * `path` - Path to the rule set file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use quarry::config::load_config;
///
/// let config = load_config(Path::new("quotes.json")).unwrap();
/// println!("Start URLs: {:?}", config.start_urls);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let config = match extension.as_str() {
        "json" => parse_config_json(&content)?,
        "toml" => parse_config_toml(&content)?,
        other => {
            return Err(ConfigError::UnsupportedFormat(format!(
                "'{}' (expected .json or .toml)",
                other
            )))
        }
    };

    validate(&config)?;

    Ok(config)
}

/// Parses a rule set from its JSON interchange form (no validation)
pub fn parse_config_json(content: &str) -> Result<CrawlConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parses a rule set from TOML (no validation)
pub fn parse_config_toml(content: &str) -> Result<CrawlConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Serializes a rule set to its canonical JSON interchange form
pub fn to_json(config: &CrawlConfig) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Computes a SHA-256 hash of the rule set file content
///
/// Used to detect whether a rule set changed between runs.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a rule set and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(CrawlConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
