//! Quarry: a configuration-driven web extraction engine
//!
//! This crate implements a single generic crawler whose scraping behavior
//! (start URLs, item schema, field selectors, type coercion, pagination and
//! output classification) is defined entirely by a declarative
//! [`CrawlConfig`] rather than by per-site code.
//!
//! The extraction core (`config`, `extract`, `classify`, `engine`) is
//! synchronous and performs no I/O. The `crawler` and `output` modules are
//! reference collaborators that fetch pages and persist records.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod engine;
pub mod extract;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Quarry operations
#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// Every variant means the configuration cannot be used; no fetch is
/// attempted for it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for '{field}': {message}")]
    InvalidSelector { field: String, message: String },

    #[error("Invalid refinement pattern for '{field}': {message}")]
    InvalidPattern { field: String, message: String },

    #[error("Invalid domain pattern: {0}")]
    InvalidDomain(String),
}

impl ConfigError {
    /// Human-readable reason, without the error-kind prefix
    pub fn reason(&self) -> String {
        match self {
            Self::Invalid(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Field extraction errors
///
/// Absence is not an error: a selector that matches nothing yields `Ok(None)`.
/// This type only reports values that were present but unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Field '{field}': cannot coerce '{value}' to {value_type}")]
    Malformed {
        field: String,
        value: String,
        value_type: config::ValueType,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::{classify, ArticleRecord, QuoteRecord, ReportRecord, TypedRecord};
pub use config::{CrawlConfig, FieldRule, OutputType, ValueType};
pub use engine::{CrawlEngine, PageOutcome};
pub use extract::{ExtractedRecord, FieldValue, Page, PaginationState};
