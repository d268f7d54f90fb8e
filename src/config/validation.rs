use crate::config::types::{CrawlConfig, PaginationRule};
use crate::ConfigError;
use url::Url;

/// Validates the structural completeness of a rule set
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 1. start URLs present
/// 2. field rules present
/// 3. every field rule has a selector
/// 4. pagination, when enabled, has a selector and `max_pages >= 1`
///
/// followed by start URL syntax and allowed-domain pattern checks.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.start_urls.is_empty() {
        return Err(ConfigError::Invalid("missing start URLs".to_string()));
    }

    if config.fields.is_empty() {
        return Err(ConfigError::Invalid("missing field rules".to_string()));
    }

    for (name, rule) in &config.fields {
        if rule.selector.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "field '{}' has an empty selector",
                name
            )));
        }
    }

    validate_pagination(&config.pagination)?;
    validate_start_urls(&config.start_urls)?;

    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

/// Validates the pagination rule (only when enabled)
fn validate_pagination(rule: &PaginationRule) -> Result<(), ConfigError> {
    if !rule.enabled {
        return Ok(());
    }

    if rule.next_page_selector.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "pagination enabled without a next page selector".to_string(),
        ));
    }

    if rule.max_pages < 1 {
        return Err(ConfigError::Invalid(format!(
            "pagination max pages must be >= 1, got {}",
            rule.max_pages
        )));
    }

    Ok(())
}

/// Every seed must be an absolute http(s) URL
fn validate_start_urls(urls: &[String]) -> Result<(), ConfigError> {
    for seed in urls {
        let url = Url::parse(seed.trim()).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", seed, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Start URL '{}' must use http or https",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates a domain pattern (supports `*.` wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain pattern '{}' is empty",
            pattern
        )));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    Ok(())
}
