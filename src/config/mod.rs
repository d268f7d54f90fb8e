//! Configuration module for Quarry
//!
//! This module holds the typed rule set model, its JSON/TOML loaders and the
//! structural validation that runs before any page is fetched.
//!
//! # Example
//!
//! ```no_run
//! use quarry::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quotes.json")).unwrap();
//! println!("Crawler will follow at most {} pages", config.pagination.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, DataProcessing, FetchPolicy, FieldRule, ItemSelector, OutputType,
    PaginationRule, ValueType,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config_json,
    parse_config_toml, to_json,
};

pub use validation::validate;
