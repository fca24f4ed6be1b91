//! Geo-Ripple main entry point
//!
//! This is the command-line interface for the Geo-Ripple crawler.

use clap::Parser;
use geo_ripple::config::{load_config_with_hash, Config};
use geo_ripple::seeds::load_seeds;
use geo_ripple::Coordinator;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Geo-Ripple: a concurrent geolocating web crawler
///
/// Geo-Ripple crawls outward from a set of seed URLs with a fixed pool of
/// workers and records, for every page it reaches, the fetch latency, the
/// country its server is located in, its IP address and its URL.
#[derive(Parser, Debug)]
#[command(name = "geo-ripple")]
#[command(version)]
#[command(about = "A concurrent geolocating web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed file to use instead of the one named in the configuration
    #[arg(long, value_name = "FILE")]
    seeds: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seeds without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let seed_path = cli
        .seeds
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.seed_path));
    let seeds = match load_seeds(&seed_path) {
        Ok(seeds) => seeds,
        Err(e) => {
            tracing::error!("Failed to read seeds from {}: {}", seed_path.display(), e);
            return Err(e.into());
        }
    };
    tracing::info!("Read {} seed line(s) from {}", seeds.len(), seed_path.display());

    if cli.dry_run {
        handle_dry_run(&config, &seed_path, &seeds);
    } else {
        handle_crawl(config, seeds, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("geo_ripple=info,warn"),
            1 => EnvFilter::new("geo_ripple=debug,info"),
            2 => EnvFilter::new("geo_ripple=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, seed_path: &Path, seeds: &[String]) {
    println!("=== Geo-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    match config.crawler.limit {
        Some(limit) => println!("  URL limit: {}", limit),
        None => println!("  URL limit: unbounded"),
    }
    println!("  Pacing delay: {}ms", config.crawler.pacing_delay);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout);
    println!("  Frontier order: {:?}", config.crawler.frontier_order);

    println!("\nEnrichment:");
    println!("  Endpoint: {}", config.enrichment.endpoint);
    println!("  Max attempts: {}", config.enrichment.max_attempts);
    println!("  Backoff: {}ms", config.enrichment.backoff);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);

    println!("\nSeeds ({}, from {}):", seeds.len(), seed_path.display());
    let mut valid = 0;
    for seed in seeds {
        match geo_ripple::normalize_url(seed) {
            Ok(url) => {
                valid += 1;
                println!("  * {}", url);
            }
            Err(e) => println!("  ✗ {} ({})", seed, e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", valid);
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    seeds: Vec<String>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Writing results to {} with {} worker(s)",
        config.output.results_path,
        config.crawler.workers
    );

    let mut coordinator = Coordinator::new(config)?;
    if coordinator.seed(&seeds) == 0 {
        tracing::warn!("No usable seed URLs");
    }

    // Stop handing out work on ctrl-c; pages in flight are still recorded
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight pages");
            token.cancel();
        }
    });

    match coordinator.run().await {
        Ok(summary) => {
            if !quiet {
                println!("\n{}", summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
