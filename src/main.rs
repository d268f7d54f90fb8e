//! Quarry main entry point
//!
//! This is the command-line interface for the Quarry extraction engine.

use anyhow::Context;
use clap::Parser;
use quarry::config::{load_config_with_hash, CrawlConfig};
use quarry::crawler::{CrawlDriver, HttpFetcher};
use quarry::output::{print_report, JsonLinesSink};
use quarry::CrawlEngine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Quarry: a configuration-driven web extraction engine
///
/// Quarry fetches listing pages named by a rule set, extracts one record per
/// item, follows pagination and detail links, and writes the classified
/// records as JSON Lines.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "A configuration-driven web extraction engine", long_about = None)]
struct Cli {
    /// Path to a JSON or TOML rule set
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// File to write records to, one JSON object per line
    #[arg(short, long, value_name = "FILE", default_value = "quarry_data.jsonl")]
    output: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the rule set and show what would be crawled without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading rule set from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load rule set {}", cli.config.display()))?;
    tracing::info!("Rule set loaded (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(config)
    } else {
        handle_crawl(config, cli.output).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quarry=info,warn"),
            1 => EnvFilter::new("quarry=debug,info"),
            2 => EnvFilter::new("quarry=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: compiles the rule set and prints what it would do
fn handle_dry_run(config: CrawlConfig) -> anyhow::Result<()> {
    let engine = CrawlEngine::new(config).context("Rule set is invalid")?;
    let config = engine.config();

    println!("=== Quarry Dry Run ===\n");

    println!("Fetch Policy:");
    println!(
        "  Delay: {}s (randomize factor {})",
        config.fetch_policy.delay, config.fetch_policy.randomize_factor
    );
    println!("  Concurrency: {}", config.fetch_policy.concurrency);
    println!("  User agent: {}", config.fetch_policy.user_agent);

    println!("\nStart URLs ({}):", engine.start_urls().len());
    for url in engine.start_urls() {
        println!("  - {}", url);
    }

    if !config.allowed_domains.is_empty() {
        println!("\nAllowed Domains ({}):", config.allowed_domains.len());
        for domain in &config.allowed_domains {
            println!("  - {}", domain);
        }
    }

    println!("\nItems:");
    println!(
        "  List selector: {}",
        config.list_selector().unwrap_or("(whole page)")
    );
    if let Some(detail) = config.detail_url_selector() {
        println!("  Detail URL selector: {}", detail);
    }

    println!("\nFields ({}):", config.fields.len());
    for (name, rule) in &config.fields {
        println!(
            "  - {}: {} [{}]{}",
            name,
            rule.selector,
            rule.value_type,
            if rule.required { " required" } else { "" }
        );
    }

    if engine.paginator().is_enabled() {
        println!(
            "\nPagination: up to {} pages per start URL",
            config.pagination.max_pages
        );
    }

    println!("\nOutput type: {}", config.output_type);

    println!("\n✓ Rule set is valid");
    println!("✓ Would start crawling with {} start URLs", engine.start_urls().len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig, output: PathBuf) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetch_policy)?;
    let engine = CrawlEngine::new(config).context("Rule set is invalid")?;

    let mut sink = JsonLinesSink::create(&output)
        .with_context(|| format!("Failed to open output file {}", output.display()))?;

    tracing::info!("Writing records to {}", output.display());

    let report = match CrawlDriver::new(engine, fetcher).run(&mut sink).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);

    Ok(())
}
