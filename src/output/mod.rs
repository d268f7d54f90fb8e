//! Output module for persisting classified records
//!
//! This module handles:
//! - The [`RecordSink`] seam the crawl driver writes through
//! - JSON Lines output with a crawl timestamp per record
//! - Optional duplicate removal in front of any sink
//! - Crawl run statistics

mod dedup;
mod jsonl;
pub mod stats;
mod traits;

pub use dedup::DedupSink;
pub use jsonl::JsonLinesSink;
pub use stats::{print_report, CrawlReport};
pub use traits::{MemorySink, RecordSink, SinkError, SinkResult};
