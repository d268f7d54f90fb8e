use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root crawl rule set
///
/// The JSON shape of this struct is the interchange format for rule sets.
/// Field names follow the camelCase spelling; the snake_case keys used by
/// older rule stores are accepted as aliases on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Seed locations, in the order they are crawled
    #[serde(rename = "startURLs", alias = "start_urls", default)]
    pub start_urls: Vec<String>,

    /// Hostnames (or `*.domain` wildcards) followed links must stay within
    #[serde(rename = "allowedDomains", alias = "allowed_domains", default)]
    pub allowed_domains: Vec<String>,

    /// Advisory throttling settings for the fetch collaborator
    #[serde(rename = "fetchPolicy", alias = "spider_settings", default)]
    pub fetch_policy: FetchPolicy,

    /// Splits a listing page into repeated item nodes
    #[serde(
        rename = "itemSelector",
        alias = "item_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub item_selector: Option<ItemSelector>,

    /// Field name to extraction rule
    #[serde(alias = "data_fields", default)]
    pub fields: BTreeMap<String, FieldRule>,

    #[serde(default)]
    pub pagination: PaginationRule,

    /// Shape of the classified records
    ///
    /// Older rule stores nest this as `output_settings.data_type`.
    #[serde(
        rename = "outputType",
        alias = "output_type",
        alias = "output_settings",
        default,
        deserialize_with = "deserialize_output_type"
    )]
    pub output_type: OutputType,

    #[serde(rename = "dataProcessing", alias = "data_processing", default)]
    pub data_processing: DataProcessing,
}

impl CrawlConfig {
    /// The list selector, if one is configured and non-blank
    pub fn list_selector(&self) -> Option<&str> {
        self.item_selector
            .as_ref()
            .and_then(|s| s.list_selector.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The detail link selector, if one is configured and non-blank
    pub fn detail_url_selector(&self) -> Option<&str> {
        self.item_selector
            .as_ref()
            .and_then(|s| s.detail_url_selector.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Names of all fields marked as required
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, rule)| rule.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Politeness settings handed to the fetch collaborator
///
/// The engine never enforces these itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchPolicy {
    /// Base delay between requests of one page sequence (seconds)
    #[serde(alias = "download_delay", default = "default_delay")]
    pub delay: f64,

    /// Relative jitter applied to `delay`, in `[0, 1]`
    #[serde(
        rename = "randomizeFactor",
        alias = "randomize_download_delay",
        default = "default_randomize_factor"
    )]
    pub randomize_factor: f64,

    /// Maximum number of page sequences fetched at once
    #[serde(alias = "concurrent_requests", default = "default_concurrency")]
    pub concurrency: u32,

    #[serde(
        rename = "userAgent",
        alias = "user_agent",
        default = "default_user_agent"
    )]
    pub user_agent: String,
}

fn default_delay() -> f64 {
    1.0
}

fn default_randomize_factor() -> f64 {
    0.5
}

fn default_concurrency() -> u32 {
    16
}

fn default_user_agent() -> String {
    format!("quarry/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            randomize_factor: default_randomize_factor(),
            concurrency: default_concurrency(),
            user_agent: default_user_agent(),
        }
    }
}

/// Item splitting rules for listing pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSelector {
    #[serde(
        rename = "listSelector",
        alias = "list_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub list_selector: Option<String>,

    #[serde(
        rename = "detailURLSelector",
        alias = "detail_url_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub detail_url_selector: Option<String>,
}

/// One field's extraction recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// CSS selector, optionally ending in `::text` or `::attr(name)`
    #[serde(default)]
    pub selector: String,

    #[serde(rename = "valueType", alias = "type", default)]
    pub value_type: ValueType,

    #[serde(default)]
    pub required: bool,

    /// Regex applied after selection; group 1 wins over the full match
    #[serde(
        rename = "refinementPattern",
        alias = "regex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub refinement_pattern: Option<String>,
}

impl FieldRule {
    /// Optional string field with no refinement
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            value_type: ValueType::String,
            required: false,
            refinement_pattern: None,
        }
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn refine(mut self, pattern: impl Into<String>) -> Self {
        self.refinement_pattern = Some(pattern.into());
        self
    }
}

/// Target type of a field after text extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    #[serde(alias = "STRING", alias = "str")]
    String,
    #[serde(alias = "FLOAT")]
    Float,
    #[serde(alias = "INT", alias = "integer")]
    Int,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Float => "float",
            Self::Int => "int",
        };
        f.write_str(name)
    }
}

/// Next-page following rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationRule {
    #[serde(default)]
    pub enabled: bool,

    /// Selects the next-page link; a bare selector reads `href`
    #[serde(rename = "nextPageSelector", alias = "next_page_selector", default)]
    pub next_page_selector: String,

    /// Upper bound on pages per sequence, counting the start page
    #[serde(
        rename = "maxPages",
        alias = "max_pages",
        default = "default_max_pages"
    )]
    pub max_pages: i64,
}

fn default_max_pages() -> i64 {
    10
}

impl Default for PaginationRule {
    fn default() -> Self {
        Self {
            enabled: false,
            next_page_selector: String::new(),
            max_pages: default_max_pages(),
        }
    }
}

/// Record shape a configuration's fields are classified into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    #[default]
    #[serde(alias = "QUOTE", alias = "stock_data")]
    Quote,
    #[serde(alias = "REPORT", alias = "research_report")]
    Report,
    #[serde(alias = "ARTICLE", alias = "financial_news")]
    Article,
}

/// Either a bare output type or a legacy `output_settings` table
#[derive(Deserialize)]
#[serde(untagged)]
enum OutputTypeSource {
    Plain(OutputType),
    Settings {
        #[serde(alias = "dataType", default)]
        data_type: OutputType,
    },
}

fn deserialize_output_type<'de, D>(deserializer: D) -> Result<OutputType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OutputTypeSource::deserialize(deserializer)? {
        OutputTypeSource::Plain(output_type) => output_type,
        OutputTypeSource::Settings { data_type } => data_type,
    })
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quote => "quote",
            Self::Report => "report",
            Self::Article => "article",
        };
        f.write_str(name)
    }
}

/// Post-extraction processing switches for the fetch driver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataProcessing {
    /// Drop records identical to one already emitted in the same run
    #[serde(rename = "removeDuplicates", alias = "remove_duplicates", default)]
    pub remove_duplicates: bool,
}
