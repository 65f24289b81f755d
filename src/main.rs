//! Story-Harvest main entry point
//!
//! This is the command-line interface for the Story-Harvest catalog harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use story_harvest::config::{resolve_config, Config, SourceKind};
use story_harvest::crawler::Coordinator;
use story_harvest::output::{print_report, print_statistics, read_collection, CollectionStatistics};
use tracing_subscriber::EnvFilter;

/// Story-Harvest: a paginated catalog harvester
///
/// Story-Harvest walks a range of listing pages, extracts each story's
/// metadata, collects its chapters until the first gap, writes the result
/// to a JSON file and optionally pushes that file to a git repository.
#[derive(Parser, Debug)]
#[command(name = "story-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults plus environment otherwise)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the existing collection file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Write the collection but do not push it
    #[arg(long)]
    no_publish: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file, using defaults and environment"),
    }
    let (config, config_hash) =
        resolve_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config, cli.no_publish).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("story_harvest=info,warn"),
            1 => EnvFilter::new("story_harvest=debug,info"),
            2 => EnvFilter::new("story_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Story-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Pages: {}..={}",
        config.crawler.start_page, config.crawler.end_page
    );
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Max chapters: {}", config.crawler.max_chapters);
    println!("  Chapter bound: {:?}", config.crawler.chapter_bound);
    match config.crawler.max_items {
        Some(max) => println!("  Max items: {}", max),
        None => println!("  Max items: unlimited"),
    }
    println!("  Item delay: {}ms", config.crawler.item_delay_ms);

    println!("\nSource:");
    match config.source.kind {
        SourceKind::Html => {
            println!("  Kind: html");
            println!("  Listing: {}", config.source.list_url);
            println!("  Chapters: {}", config.source.chapter_url);
        }
        SourceKind::Api => {
            println!("  Kind: api");
            println!(
                "  Base: {}",
                config.source.api_base.as_deref().unwrap_or("-")
            );
            println!(
                "  API key: {}",
                if config.source.api_key.is_some() { "set" } else { "not set" }
            );
        }
    }

    println!("\nOutput:");
    println!("  Collection: {}", config.output.path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\nPublish:");
    let missing = config.publish.missing_fields();
    if missing.is_empty() {
        println!(
            "  {} ({}) from {}",
            config.publish.repository.as_deref().unwrap_or("-"),
            config.publish.branch,
            config.publish.workdir
        );
    } else {
        println!("  Disabled, missing: {}", missing.join(", "));
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics of the written collection
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.output.path);
    println!("Collection: {}\n", path.display());

    let collection = read_collection(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    print_statistics(&CollectionStatistics::from_collection(&collection));

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, no_publish: bool) -> anyhow::Result<()> {
    let mut coordinator = Coordinator::new(config).context("Failed to set up harvest")?;
    if no_publish {
        tracing::info!("Publishing turned off for this run");
        coordinator = coordinator.without_publisher();
    }

    match coordinator.run().await {
        Ok(report) => {
            if !report.publish.is_ok() {
                tracing::error!("Harvest completed but publishing failed");
            }
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
