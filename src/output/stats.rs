//! Crawl run statistics
//!
//! The driver accumulates a [`CrawlReport`] per page sequence and merges
//! them once every sequence has finished.

use serde::Serialize;

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Page sequences started (one per start URL)
    pub sequences: u64,

    /// Pages fetched successfully, listing and detail pages alike
    pub pages_fetched: u64,

    /// Fetches that failed; each ends at most one sequence
    pub fetch_failures: u64,

    /// Records produced by the engine
    pub records_emitted: u64,

    /// Items dropped for a missing required field
    pub items_skipped: u64,

    /// Fields present on the page but not coercible
    pub malformed_fields: u64,

    /// Records dropped by duplicate removal
    pub duplicates_dropped: u64,

    /// Records handed to the sink
    pub records_written: u64,
}

impl CrawlReport {
    pub fn merge(&mut self, other: &CrawlReport) {
        self.sequences += other.sequences;
        self.pages_fetched += other.pages_fetched;
        self.fetch_failures += other.fetch_failures;
        self.records_emitted += other.records_emitted;
        self.items_skipped += other.items_skipped;
        self.malformed_fields += other.malformed_fields;
        self.duplicates_dropped += other.duplicates_dropped;
        self.records_written += other.records_written;
    }
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Pages:");
    println!("  Sequences: {}", report.sequences);
    println!("  Fetched: {}", report.pages_fetched);
    println!("  Failed: {}", report.fetch_failures);
    println!();

    println!("Records:");
    println!("  Extracted: {}", report.records_emitted);
    println!("  Skipped items: {}", report.items_skipped);
    println!("  Malformed fields: {}", report.malformed_fields);
    if report.duplicates_dropped > 0 {
        println!("  Duplicates dropped: {}", report.duplicates_dropped);
    }
    println!("  Written: {}", report.records_written);
    println!();

    let attempted = report.pages_fetched + report.fetch_failures;
    let success_rate = if attempted > 0 {
        (report.pages_fetched as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetches succeeded)",
        success_rate, report.pages_fetched, attempted
    );
}
