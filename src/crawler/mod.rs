//! Crawler module: the reference fetch driver around the engine
//!
//! This module contains:
//! - The [`Fetcher`] seam and its HTTP implementation
//! - Randomized politeness delays between requests
//! - The [`CrawlDriver`] that walks page sequences and feeds a sink

mod driver;
mod fetcher;
mod throttle;

pub use driver::CrawlDriver;
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher, PageContent};
pub use throttle::Throttle;

use crate::config::CrawlConfig;
use crate::engine::CrawlEngine;
use crate::output::{CrawlReport, RecordSink};
use crate::QuarryError;

/// Runs a complete crawl over HTTP
///
/// Compiles `config`, fetches every page sequence it describes and writes
/// the classified records to `sink`.
pub async fn crawl<S: RecordSink>(
    config: CrawlConfig,
    sink: &mut S,
) -> Result<CrawlReport, QuarryError> {
    let fetcher = HttpFetcher::new(&config.fetch_policy)?;
    let engine = CrawlEngine::new(config)?;
    CrawlDriver::new(engine, fetcher).run(sink).await
}
