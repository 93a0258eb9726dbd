//! Vacancy-Harvest main entry point
//!
//! This is the command-line interface for the Vacancy-Harvest crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use vacancy_harvest::config::{load_config_with_hash, Config};
use vacancy_harvest::crawler::{harvest, CrawlSession};
use vacancy_harvest::output::{print_report, resolve_destination, ConflictPolicy};
use vacancy_harvest::HarvestError;

/// Vacancy-Harvest: a polite job-listing crawler
///
/// Walks the search results for QUERY, extracts every listing and appends
/// it to a newline-delimited JSON file as soon as it is read.
#[derive(Parser, Debug)]
#[command(name = "vacancy-harvest")]
#[command(version)]
#[command(about = "A polite job-listing crawler", long_about = None)]
struct Cli {
    /// Search text (may contain spaces)
    #[arg(value_name = "QUERY", default_value = "data scientist")]
    query: String,

    /// Output file (newline-delimited JSON)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Number of listings to process, or "all"
    #[arg(short = 'n', long, value_name = "N|all", value_parser = parse_limit)]
    limit: Option<ItemLimit>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Replace the output file if it already exists
    #[arg(long, conflicts_with = "append")]
    overwrite: bool,

    /// Append to the output file if it already exists
    #[arg(long, conflicts_with = "overwrite")]
    append: bool,

    /// Show the resolved configuration and search URL without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Item limit as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemLimit {
    All,
    Count(usize),
}

impl ItemLimit {
    fn as_max_items(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Count(n) => Some(n),
        }
    }
}

fn parse_limit(value: &str) -> Result<ItemLimit, String> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(ItemLimit::All);
    }
    value
        .parse::<usize>()
        .map(ItemLimit::Count)
        .map_err(|_| format!("expected a non-negative number or \"all\", got '{}'", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(limit) = cli.limit {
        config.crawler.max_items = limit.as_max_items();
    }
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.path));

    if cli.dry_run {
        return handle_dry_run(&config, &cli.query, &output);
    }

    let code = handle_harvest(config, &cli.query, &output, conflict_policy(&cli)).await?;
    std::process::exit(code);
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vacancy_harvest=info,warn"),
            1 => EnvFilter::new("vacancy_harvest=debug,info"),
            2 => EnvFilter::new("vacancy_harvest=trace,debug"),
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

fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn conflict_policy(cli: &Cli) -> ConflictPolicy {
    if cli.overwrite {
        ConflictPolicy::Overwrite
    } else if cli.append {
        ConflictPolicy::Append
    } else {
        ConflictPolicy::Fail
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, query: &str, output: &Path) -> anyhow::Result<()> {
    let session = CrawlSession::new(config)?;

    println!("=== Vacancy-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", query);
    println!("  URL: {}", session.search_url(query));
    match config.crawler.max_items {
        Some(n) => println!("  Item limit: {}", n),
        None => println!("  Item limit: all"),
    }

    println!("\nCrawler:");
    println!("  Politeness delay: {:?}", session.politeness_delay());
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  File: {}", output.display());
    if output.exists() {
        println!("  (exists: pass --overwrite, --append or another --output)");
    }

    println!("\nSelectors:");
    for (field, selector) in config.selectors.named() {
        println!("  {}: {}", field, selector);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main harvest operation and returns the process exit code
async fn handle_harvest(
    config: Config,
    query: &str,
    output: &Path,
    policy: ConflictPolicy,
) -> anyhow::Result<i32> {
    let destination = match resolve_destination(output, policy) {
        Ok(path) => path,
        Err(HarvestError::DestinationConflict { path }) => {
            tracing::error!(
                "Output {} already exists; use --overwrite, --append or choose another --output",
                path
            );
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping harvest");
            signal_token.cancel();
        }
    });

    tracing::info!("Writing records to {}", destination.display());
    let report = harvest(config, query, &destination, cancel).await?;

    print_report(&report);

    let code = if report.is_completed() {
        0
    } else if report.was_cancelled() {
        130
    } else {
        1
    };
    Ok(code)
}
