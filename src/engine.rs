//! Per-page extraction engine
//!
//! [`CrawlEngine`] is built once from a validated configuration and then
//! processes fetched pages one at a time. It performs no I/O and holds no
//! mutable state; the only state that changes is the caller's
//! [`PaginationState`].

use crate::config::{validate, CrawlConfig};
use crate::extract::{
    AssemblyStats, ExtractedRecord, Page, PaginationState, Paginator, RecordAssembler,
};
use crate::url::{parse_http_url, DomainFilter};
use crate::ConfigError;
use url::Url;

/// Everything produced by processing one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutcome {
    /// Records in document order
    pub records: Vec<ExtractedRecord>,

    /// Next page of this sequence, already domain-filtered
    pub next_page: Option<Url>,

    /// Detail pages to fetch, already domain-filtered
    pub detail_links: Vec<Url>,

    pub stats: AssemblyStats,
}

/// A rule set compiled for extraction
#[derive(Debug, Clone)]
pub struct CrawlEngine {
    config: CrawlConfig,
    start_urls: Vec<Url>,
    assembler: RecordAssembler,
    paginator: Paginator,
    domains: DomainFilter,
}

impl CrawlEngine {
    /// Validates and compiles a configuration
    ///
    /// Any structural problem, unparsable selector or pattern, or bad start
    /// URL is reported here, before a single page is fetched.
    pub fn new(config: CrawlConfig) -> Result<Self, ConfigError> {
        validate(&config)?;

        let start_urls = config
            .start_urls
            .iter()
            .map(|s| {
                parse_http_url(s).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let assembler = RecordAssembler::new(&config)?;
        let paginator = Paginator::new(&config.pagination)?;
        let domains = DomainFilter::new(&config.allowed_domains);

        Ok(Self {
            config,
            start_urls,
            assembler,
            paginator,
            domains,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn start_urls(&self) -> &[Url] {
        &self.start_urls
    }

    pub fn assembler(&self) -> &RecordAssembler {
        &self.assembler
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Processes one page of a sequence
    ///
    /// Assembles the page's records, resolves detail links, and decides the
    /// next page (advancing `state` when one is found). Links outside the
    /// allowed domains are dropped.
    pub fn process_page(&self, page: &Page, state: &mut PaginationState) -> PageOutcome {
        let mut records = self.assembler.assemble_all(page);
        let collected: Vec<ExtractedRecord> = records.by_ref().collect();
        let stats = records.stats();

        let detail_links = self
            .assembler
            .detail_links(page)
            .into_iter()
            .filter(|link| self.follow(link))
            .collect();

        let next_page = self
            .paginator
            .next_page(page, state)
            .filter(|link| self.follow(link));

        tracing::info!(
            url = %page.url(),
            page = state.current_page(),
            "Extracted {} records ({} items skipped, {} malformed fields)",
            stats.records_emitted,
            stats.items_skipped,
            stats.malformed_fields
        );

        PageOutcome {
            records: collected,
            next_page,
            detail_links,
            stats,
        }
    }

    /// Processes a detail page as a single whole-page item
    ///
    /// Detail pages never paginate and never yield further detail links.
    pub fn process_detail_page(&self, page: &Page) -> PageOutcome {
        let mut records = self.assembler.assemble_whole(page);
        let collected: Vec<ExtractedRecord> = records.by_ref().collect();
        let stats = records.stats();

        tracing::debug!(
            url = %page.url(),
            "Extracted {} records from detail page",
            collected.len()
        );

        PageOutcome {
            records: collected,
            next_page: None,
            detail_links: Vec::new(),
            stats,
        }
    }

    /// Applies the allowed-domain gate to a followed link
    fn follow(&self, link: &Url) -> bool {
        let allowed = self.domains.allows(link);
        if !allowed {
            tracing::debug!("Dropping link outside allowed domains: {}", link);
        }
        allowed
    }
}
