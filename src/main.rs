//! Dynascrape main entry point
//!
//! This is the command-line interface for the Dynascrape article crawler.

use anyhow::Context;
use clap::Parser;
use dynascrape::config::{load_config_with_hash, validate, Config};
use dynascrape::crawler::print_statistics;
use dynascrape::job::{parse_request, RequestDefaults};
use dynascrape::sink::{RunStatus, SqliteSink};
use dynascrape::{CrawlEngine, JobRegistry};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Dynascrape: a rule-driven article crawler
///
/// Dynascrape walks listing pages under a pagination budget, follows the item
/// links picked out by CSS selector rules, and stores one article row per
/// item page in SQLite.
#[derive(Parser, Debug)]
#[command(name = "dynascrape")]
#[command(version = "1.0.0")]
#[command(about = "A rule-driven article crawler", long_about = None)]
struct Cli {
    /// JSON crawl request (a list of sites with their rules); "-" reads stdin
    #[arg(value_name = "REQUEST_JSON", required_unless_present = "stats")]
    request: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the request and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show article and run counts from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            tracing::info!("No configuration file given, using defaults");
            config
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    let Some(request_path) = cli.request.as_deref() else {
        anyhow::bail!("A crawl request is required");
    };
    let payload = read_request(request_path)?;

    if cli.dry_run {
        handle_dry_run(&config, &payload)
    } else {
        handle_crawl(config, &payload).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dynascrape=info,warn"),
            1 => EnvFilter::new("dynascrape=debug,info"),
            2 => EnvFilter::new("dynascrape=trace,debug"),
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

fn read_request(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("Failed to read request from stdin")?;
        return Ok(payload);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))
}

/// Handles the --dry-run mode: validates the request and shows the site jobs
fn handle_dry_run(config: &Config, payload: &str) -> anyhow::Result<()> {
    let jobs = parse_request(
        payload,
        RequestDefaults::from_config(config),
        &dynascrape::CssQuery::new(),
    )?;

    println!("=== Dynascrape Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Dedupe URLs: {}", config.crawler.dedupe_urls);
    println!("  User agent: {}", config.user_agent.header_value());
    println!("  Database: {}", config.output.database_path);

    println!("\nSites ({}):", jobs.len());
    for job in &jobs {
        println!("  - {}", job.website_url);
        println!("    max pagination: {}", job.max_pagination);
        if !job.search_keyword.is_empty() {
            println!("    search keyword: {}", job.search_keyword);
        }
        println!("    item_url: {}", job.list_rules.item_url);
        if let Some(next) = &job.list_rules.next_page_url {
            println!("    next_page_url: {}", next);
        }
        for (field, expression) in job.item_rules.iter() {
            println!("    {}: {}", field, expression);
        }
        for seed in &job.seed_pagination_urls {
            println!("    * {}", seed);
        }
    }

    println!("\n✓ Request is valid");
    Ok(())
}

/// Handles the --stats mode: shows counts from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let sink = SqliteSink::new(
        Path::new(&config.output.database_path),
        &config.output.tags_delimiter,
    )?;

    println!("=== Stored Data ===");
    println!("  Articles: {}", sink.count_articles()?);
    for status in [
        RunStatus::Completed,
        RunStatus::Cancelled,
        RunStatus::Failed,
        RunStatus::Running,
    ] {
        println!("  Runs {}: {}", status.to_db_string(), sink.count_runs(status)?);
    }

    if let Some(run) = sink.latest_run()? {
        println!(
            "  Latest run: #{} {} ({} sites, started {})",
            run.id,
            run.status.to_db_string(),
            run.site_count,
            run.started_at
        );
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, payload: &str) -> anyhow::Result<()> {
    let sink = Arc::new(SqliteSink::new(
        Path::new(&config.output.database_path),
        &config.output.tags_delimiter,
    )?);
    let engine = CrawlEngine::from_config(&config)?;
    let registry = JobRegistry::new(engine, sink, RequestDefaults::from_config(&config));

    let handle = registry.submit_payload(payload)?;
    let job_id = handle.id();
    tracing::info!("Submitted job {}", job_id);

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling job {}", job_id);
            cancel.cancel();
        }
    });

    let summary = handle.wait().await?;

    for site in &summary.sites {
        print_statistics(site.website_url.as_str(), &site.stats);
    }
    print_statistics("Total", &summary.totals());
    println!(
        "Run #{} {}: {} records stored",
        summary.run_id,
        summary.status.to_db_string(),
        summary.records_stored()
    );

    Ok(())
}
