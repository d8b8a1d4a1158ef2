//! Site-Sift main entry point
//!
//! This is the command-line interface for the Site-Sift crawler.

use anyhow::Context;
use clap::Parser;
use site_sift::config::{load_config_with_hash, Config};
use site_sift::crawler::{CrawlConfig, CrawlOutcome, Crawler};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Site-Sift: a bounded-concurrency site crawler
///
/// Crawls every seed URL within its domain, extracts the readable text of each
/// page and prints the results per seed as JSON, or posts them one by one to a
/// webhook endpoint.
#[derive(Parser, Debug)]
#[command(name = "site-sift")]
#[command(version)]
#[command(about = "A bounded-concurrency site crawler", long_about = None)]
struct Cli {
    /// Seed URLs to crawl
    #[arg(value_name = "URLS", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Post each result to this endpoint instead of printing summaries
    #[arg(long, value_name = "URL")]
    webhook_url: Option<Url>,

    /// Results per seed before expansion stops (0 = unbounded)
    #[arg(long, value_name = "N", default_value_t = 0)]
    max_links: usize,

    /// Emit raw page content instead of extracted text
    #[arg(long)]
    raw: bool,

    /// Seconds to wait before each webhook delivery
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    delay: u64,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let crawler = Crawler::new(&config).context("invalid crawler configuration")?;

    let mut options = CrawlConfig::default()
        .with_max_links(cli.max_links)
        .with_clean_text(!cli.raw)
        .with_dispatch_delay(Duration::from_secs(cli.delay));
    if let Some(endpoint) = cli.webhook_url {
        options = options.with_webhook(endpoint);
    }

    match crawler.run(&cli.urls, &options).await {
        CrawlOutcome::Summaries(summaries) => {
            for summary in &summaries {
                tracing::info!(
                    "{}: {} results, {} words",
                    summary.seed_url,
                    summary.results.len(),
                    summary.total_words()
                );
            }
            let json = serde_json::to_string_pretty(&summaries)?;
            println!("{}", json);
        }
        CrawlOutcome::Dispatched {
            seeds,
            endpoint,
            deliveries,
        } => {
            tracing::info!(
                "Offered {} result(s) from {} seed(s), {} delivered",
                deliveries.attempted(),
                seeds,
                deliveries.delivered
            );
            println!(
                "Webhook processing initiated. Links will be sent to {}.",
                endpoint
            );
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_sift=info,warn"),
            1 => EnvFilter::new("site_sift=debug,info"),
            2 => EnvFilter::new("site_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
