//! Extraction module: field extraction, record assembly and pagination
//!
//! Everything here is synchronous and free of I/O. A fetched page is parsed
//! once into a [`Page`] and can then be walked any number of times; the
//! same page and configuration always produce the same records.

mod assembler;
mod field;
mod pagination;
mod selector;

pub use assembler::{AssemblyStats, Records, RecordAssembler};
pub use field::{coerce, refine, FieldExtractor};
pub use pagination::{PaginationState, Paginator};
pub use selector::{FieldSelector, SelectMode};

use crate::config::OutputType;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// A fetched page, parsed and ready for extraction
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    /// Parses raw markup fetched from `url` (the final URL after redirects)
    pub fn parse(url: Url, markup: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(markup),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// The implicit single item used when no list selector is configured
    pub fn root(&self) -> ElementRef<'_> {
        self.document.root_element()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page").field("url", &self.url.as_str()).finish()
    }
}

/// A typed field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; strings are parsed leniently
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    /// Integer view; floats qualify only when they have no fractional part
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::String(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// The engine's output unit
///
/// Holds only the fields that were successfully extracted. Immutable once
/// emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    fields: BTreeMap<String, FieldValue>,
    #[serde(rename = "sourceURL")]
    source_url: Url,
    #[serde(rename = "outputType")]
    output_type: OutputType,
}

impl ExtractedRecord {
    pub fn new(
        fields: BTreeMap<String, FieldValue>,
        source_url: Url,
        output_type: OutputType,
    ) -> Self {
        Self {
            fields,
            source_url,
            output_type,
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn into_parts(self) -> (BTreeMap<String, FieldValue>, Url, OutputType) {
        (self.fields, self.source_url, self.output_type)
    }
}
