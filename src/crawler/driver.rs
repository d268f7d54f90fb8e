//! Crawl driver
//!
//! Runs one page sequence per start URL. Sequences proceed concurrently up
//! to the policy's concurrency limit; pages within a sequence are strictly
//! serial because each next-page link is only known once the previous page
//! has been processed.

use crate::classify::classify;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::throttle::Throttle;
use crate::engine::{CrawlEngine, PageOutcome};
use crate::extract::{AssemblyStats, ExtractedRecord, Page, PaginationState};
use crate::output::{CrawlReport, DedupSink, RecordSink};
use crate::QuarryError;
use futures::stream::{self, StreamExt};
use url::Url;

/// Drives fetches for a compiled rule set
pub struct CrawlDriver<F> {
    engine: CrawlEngine,
    fetcher: F,
    throttle: Throttle,
}

/// Records of one finished sequence, in emission order
struct SequenceOutput {
    records: Vec<ExtractedRecord>,
    report: CrawlReport,
}

impl<F: Fetcher> CrawlDriver<F> {
    /// Creates a driver throttled by the rule set's fetch policy
    pub fn new(engine: CrawlEngine, fetcher: F) -> Self {
        let throttle = Throttle::from_policy(&engine.config().fetch_policy);
        Self {
            engine,
            fetcher,
            throttle,
        }
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn engine(&self) -> &CrawlEngine {
        &self.engine
    }

    /// Crawls every start URL and writes classified records to `sink`
    ///
    /// A failed fetch ends only the sequence it belongs to. Sink errors
    /// abort the run.
    pub async fn run<S: RecordSink>(&self, sink: &mut S) -> Result<CrawlReport, QuarryError> {
        let config = self.engine.config();
        let concurrency = (config.fetch_policy.concurrency as usize).max(1);

        tracing::info!(
            "Starting crawl of {} start URLs ({} output, concurrency {})",
            self.engine.start_urls().len(),
            config.output_type,
            concurrency
        );

        let mut report = CrawlReport::default();

        if config.data_processing.remove_duplicates {
            let mut dedup = DedupSink::new(&mut *sink);
            self.drain(concurrency, &mut dedup, &mut report).await?;
            dedup.finish()?;
            report.duplicates_dropped = dedup.dropped();
        } else {
            self.drain(concurrency, sink, &mut report).await?;
            sink.finish()?;
        }

        report.records_written = report.records_emitted - report.duplicates_dropped;

        tracing::info!(
            "Crawl complete: {} pages fetched, {} failures, {} records written",
            report.pages_fetched,
            report.fetch_failures,
            report.records_written
        );

        Ok(report)
    }

    /// Runs all sequences, forwarding each sequence's records as it finishes
    async fn drain<S: RecordSink>(
        &self,
        concurrency: usize,
        sink: &mut S,
        report: &mut CrawlReport,
    ) -> Result<(), QuarryError> {
        let mut sequences = stream::iter(self.engine.start_urls().iter().cloned())
            .map(|start| self.run_sequence(start))
            .buffer_unordered(concurrency);

        while let Some(output) = sequences.next().await {
            report.merge(&output.report);
            for record in output.records {
                sink.accept(classify(record))?;
            }
        }

        Ok(())
    }

    /// Follows one start URL through its pages
    async fn run_sequence(&self, start: Url) -> SequenceOutput {
        let mut records = Vec::new();
        let mut report = CrawlReport {
            sequences: 1,
            ..CrawlReport::default()
        };
        let mut state = PaginationState::new();
        let mut next = Some(start);
        let mut first = true;

        while let Some(url) = next.take() {
            if !first {
                self.throttle.wait().await;
            }
            first = false;

            let outcome = match self.fetch_and_process(&url, |page| {
                self.engine.process_page(page, &mut state)
            })
            .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("Ending sequence at {}: {}", url, e);
                    report.fetch_failures += 1;
                    break;
                }
            };

            report.pages_fetched += 1;
            absorb(&mut report, &outcome.stats);
            records.extend(outcome.records);

            for link in outcome.detail_links {
                self.throttle.wait().await;
                match self
                    .fetch_and_process(&link, |page| self.engine.process_detail_page(page))
                    .await
                {
                    Ok(detail) => {
                        report.pages_fetched += 1;
                        absorb(&mut report, &detail.stats);
                        records.extend(detail.records);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping detail page {}: {}", link, e);
                        report.fetch_failures += 1;
                    }
                }
            }

            next = outcome.next_page;
        }

        tracing::debug!(
            "Sequence finished after {} pages with {} records",
            state.current_page(),
            records.len()
        );

        SequenceOutput { records, report }
    }

    /// Fetches a URL and runs `process` on the parsed page
    ///
    /// The parsed document is dropped before this returns, so it never lives
    /// across an await point.
    async fn fetch_and_process<P>(&self, url: &Url, process: P) -> Result<PageOutcome, FetchError>
    where
        P: FnOnce(&Page) -> PageOutcome,
    {
        let content = self.fetcher.fetch(url).await?;
        let page = Page::parse(content.url, &content.body);
        Ok(process(&page))
    }
}

fn absorb(report: &mut CrawlReport, stats: &AssemblyStats) {
    report.records_emitted += stats.records_emitted as u64;
    report.items_skipped += stats.items_skipped as u64;
    report.malformed_fields += stats.malformed_fields as u64;
}
