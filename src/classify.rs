//! Classification of extracted records into typed output shapes
//!
//! [`classify`] is a pure re-shaping step. Known field names are copied into
//! the named slots of the shape selected by the record's output type;
//! unrecognized names are ignored so one rule set can carry extra fields.

use crate::config::OutputType;
use crate::extract::{ExtractedRecord, FieldValue};
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Market quote
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteRecord {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<i64>,
    pub source_url: String,
}

/// Analyst research report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub institution: Option<String>,
    pub publish_date: Option<String>,
    pub report_type: Option<String>,
    pub rating: Option<String>,
    pub target_price: Option<f64>,
    pub summary: Option<String>,
    pub source_url: String,
}

/// Financial news article
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub publish_time: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<String>,
    pub source_url: String,
}

/// One classified record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record_type", rename_all = "lowercase")]
pub enum TypedRecord {
    Quote(QuoteRecord),
    Report(ReportRecord),
    Article(ArticleRecord),
}

impl TypedRecord {
    pub fn output_type(&self) -> OutputType {
        match self {
            Self::Quote(_) => OutputType::Quote,
            Self::Report(_) => OutputType::Report,
            Self::Article(_) => OutputType::Article,
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            Self::Quote(r) => &r.source_url,
            Self::Report(r) => &r.source_url,
            Self::Article(r) => &r.source_url,
        }
    }

    /// A short label for log lines
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Quote(r) => r.name.as_deref().or(r.symbol.as_deref()),
            Self::Report(r) => r.title.as_deref(),
            Self::Article(r) => r.title.as_deref(),
        }
    }
}

/// Re-shapes a record according to its output type
pub fn classify(record: ExtractedRecord) -> TypedRecord {
    let (fields, source_url, output_type) = record.into_parts();
    let slots = Slots {
        fields: &fields,
        source_url: &source_url,
    };

    match output_type {
        OutputType::Quote => TypedRecord::Quote(QuoteRecord {
            symbol: slots.text("symbol"),
            name: slots.text("name"),
            price: slots.float("price"),
            change: slots.float("change"),
            change_percent: slots.float("change_percent"),
            volume: slots.int("volume"),
            source_url: slots.source(),
        }),
        OutputType::Report => TypedRecord::Report(ReportRecord {
            title: slots.text("title"),
            author: slots.text("author"),
            institution: slots.text("institution"),
            publish_date: slots.text("publish_date"),
            report_type: slots.text("report_type"),
            rating: slots.text("rating"),
            target_price: slots.float("target_price"),
            summary: slots.text("summary"),
            source_url: slots.source(),
        }),
        OutputType::Article => TypedRecord::Article(ArticleRecord {
            title: slots.text("title"),
            content: slots.text("content"),
            author: slots.text("author"),
            publish_time: slots.text("publish_time"),
            source: slots.text("source"),
            category: slots.text("category"),
            keywords: slots.text("keywords"),
            source_url: slots.source(),
        }),
    }
}

struct Slots<'a> {
    fields: &'a BTreeMap<String, FieldValue>,
    source_url: &'a Url,
}

impl Slots<'_> {
    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(FieldValue::to_string)
    }

    fn float(&self, name: &str) -> Option<f64> {
        let value = self.fields.get(name)?;
        let number = value.to_f64();
        if number.is_none() {
            tracing::debug!("Field '{}' value '{}' does not fit a numeric slot", name, value);
        }
        number
    }

    fn int(&self, name: &str) -> Option<i64> {
        let value = self.fields.get(name)?;
        let number = value.to_i64();
        if number.is_none() {
            tracing::debug!("Field '{}' value '{}' does not fit an integer slot", name, value);
        }
        number
    }

    fn source(&self) -> String {
        self.source_url.to_string()
    }
}
