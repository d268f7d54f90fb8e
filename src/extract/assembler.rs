//! Record assembly over the item nodes of a page

use crate::config::{CrawlConfig, OutputType};
use crate::extract::field::FieldExtractor;
use crate::extract::selector::{FieldSelector, SelectMode};
use crate::extract::{ExtractedRecord, FieldValue, Page};
use crate::url::resolve_link;
use crate::ConfigError;
use scraper::html::Select;
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Counters for one pass over a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub items_seen: usize,
    pub records_emitted: usize,
    pub items_skipped: usize,
    pub malformed_fields: usize,
}

impl AssemblyStats {
    pub fn merge(&mut self, other: &AssemblyStats) {
        self.items_seen += other.items_seen;
        self.records_emitted += other.records_emitted;
        self.items_skipped += other.items_skipped;
        self.malformed_fields += other.malformed_fields;
    }
}

/// Walks item nodes and turns each into a record or a skip
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    list_selector: Option<Selector>,
    detail_selector: Option<FieldSelector>,
    extractors: Vec<FieldExtractor>,
    output_type: OutputType,
}

impl RecordAssembler {
    /// Compiles the item and field selectors of `config`
    pub fn new(config: &CrawlConfig) -> Result<Self, ConfigError> {
        let list_selector = config
            .list_selector()
            .map(|css| {
                Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
                    field: "itemSelector.listSelector".to_string(),
                    message: format!("'{}': {}", css, e),
                })
            })
            .transpose()?;

        let detail_selector = config
            .detail_url_selector()
            .map(|css| {
                FieldSelector::parse_with_default(css, SelectMode::Attr("href".to_string()))
                    .map_err(|message| ConfigError::InvalidSelector {
                        field: "itemSelector.detailURLSelector".to_string(),
                        message,
                    })
            })
            .transpose()?;

        let extractors = config
            .fields
            .iter()
            .map(|(name, rule)| FieldExtractor::compile(name, rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            list_selector,
            detail_selector,
            extractors,
            output_type: config.output_type,
        })
    }

    /// Lazily assembles every item of `page`, in document order
    ///
    /// Items missing a required field are skipped. The iterator makes one
    /// pass; call again to re-walk the page.
    pub fn assemble_all<'a>(&'a self, page: &'a Page) -> Records<'a> {
        let nodes = match &self.list_selector {
            Some(selector) => ItemNodes::Listed(page.document().select(selector)),
            None => ItemNodes::Whole(Some(page.root())),
        };

        Records {
            assembler: self,
            source_url: page.url(),
            nodes,
            stats: AssemblyStats::default(),
        }
    }

    /// Assembles `page` as a single whole-page item, ignoring the list selector
    pub fn assemble_whole<'a>(&'a self, page: &'a Page) -> Records<'a> {
        Records {
            assembler: self,
            source_url: page.url(),
            nodes: ItemNodes::Whole(Some(page.root())),
            stats: AssemblyStats::default(),
        }
    }

    /// Detail links found within the item nodes of `page`, in document order
    ///
    /// Empty when no detail selector is configured.
    pub fn detail_links(&self, page: &Page) -> Vec<Url> {
        let Some(detail) = &self.detail_selector else {
            return Vec::new();
        };

        let items: Vec<ElementRef<'_>> = match &self.list_selector {
            Some(selector) => page.document().select(selector).collect(),
            None => vec![page.root()],
        };

        items
            .into_iter()
            .filter_map(|node| detail.resolve(node))
            .filter_map(|href| resolve_link(&href, page.url()))
            .collect()
    }

    /// Extracts every field of one item node
    ///
    /// Returns the record (if all required fields are present) and the
    /// number of malformed fields seen.
    fn assemble_item(
        &self,
        node: ElementRef<'_>,
        source_url: &Url,
    ) -> (Option<ExtractedRecord>, usize) {
        let mut fields = BTreeMap::new();
        let mut malformed = 0;

        for extractor in &self.extractors {
            match extractor.extract(node) {
                Ok(Some(value)) => {
                    fields.insert(extractor.name().to_string(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    malformed += 1;
                    tracing::warn!(url = %source_url, "{}", e);
                }
            }
        }

        let missing: Vec<&str> = self
            .extractors
            .iter()
            .filter(|e| e.is_required() && !fields.contains_key(e.name()))
            .map(FieldExtractor::name)
            .collect();

        if !missing.is_empty() {
            tracing::debug!(
                url = %source_url,
                "Skipping item, missing required fields {:?}: {:?}",
                missing,
                fields
            );
            return (None, malformed);
        }

        let record = ExtractedRecord::new(fields, source_url.clone(), self.output_type);
        (Some(record), malformed)
    }
}

/// The item nodes of one page
enum ItemNodes<'a> {
    Listed(Select<'a, 'a>),
    Whole(Option<ElementRef<'a>>),
}

impl<'a> Iterator for ItemNodes<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Listed(select) => select.next(),
            Self::Whole(root) => root.take(),
        }
    }
}

/// Lazy record sequence for one page
pub struct Records<'a> {
    assembler: &'a RecordAssembler,
    source_url: &'a Url,
    nodes: ItemNodes<'a>,
    stats: AssemblyStats,
}

impl Records<'_> {
    /// Counters for the items walked so far
    pub fn stats(&self) -> AssemblyStats {
        self.stats
    }
}

impl Iterator for Records<'_> {
    type Item = ExtractedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.nodes.next()?;
            self.stats.items_seen += 1;

            let (record, malformed) = self.assembler.assemble_item(node, self.source_url);
            self.stats.malformed_fields += malformed;

            match record {
                Some(record) => {
                    self.stats.records_emitted += 1;
                    return Some(record);
                }
                None => self.stats.items_skipped += 1,
            }
        }
    }
}
