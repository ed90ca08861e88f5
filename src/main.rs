//! Sharecheck main entry point
//!
//! The batch driver: reads candidate links from a file, drives per-link
//! checks through a platform checker at bounded parallelism, and reports
//! the results as a table or JSON.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use sharecheck::config::load_config_with_hash;
use sharecheck::{BaiduChecker, CheckResult, Config, PlatformChecker};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Sharecheck: batch validity checking for cloud-storage share links
#[derive(Parser, Debug)]
#[command(name = "sharecheck")]
#[command(version = "1.0.0")]
#[command(about = "Batch validity checking for cloud-storage share links", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path to a text file with one share link per line
    #[arg(value_name = "LINKS")]
    links: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// One checked link in the report
#[derive(Debug, Clone, Serialize)]
struct LinkReport {
    link: String,
    #[serde(flatten)]
    result: CheckResult,
}

/// Full batch report
#[derive(Debug, Serialize)]
struct BatchReport {
    checked_at: DateTime<Utc>,
    results: Vec<LinkReport>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let links = read_links(&cli.links)
        .with_context(|| format!("failed to read links from {}", cli.links.display()))?;
    if links.is_empty() {
        tracing::warn!("No links found in {}", cli.links.display());
        return Ok(());
    }
    tracing::info!("Checking {} link(s)", links.len());

    let checker = BaiduChecker::new(&config.checker).context("failed to build checker")?;
    let report = run_batch(&checker, links, &config).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report.results);
    }

    let invalid = report.results.iter().filter(|r| !r.result.valid).count();
    if invalid > 0 {
        std::process::exit(1);
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
            0 => EnvFilter::new("sharecheck=info,warn"),
            1 => EnvFilter::new("sharecheck=debug,info"),
            2 => EnvFilter::new("sharecheck=trace,debug"),
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

/// Reads candidate links: one per line, blank lines and `#` comments skipped
fn read_links(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Drives all checks through the checker at the configured parallelism.
///
/// When a result reports provider-side rate limiting, submission of
/// further links pauses for the configured cooldown before continuing.
/// The checker core never retries on its own.
async fn run_batch<C: PlatformChecker>(
    checker: &C,
    links: Vec<String>,
    config: &Config,
) -> BatchReport {
    let cooldown = config.batch.rate_limit_cooldown();
    let throttled = Arc::new(AtomicBool::new(false));

    let results: Vec<LinkReport> = stream::iter(links.into_iter().map(|link| {
        let throttled = Arc::clone(&throttled);
        async move {
            if throttled.swap(false, Ordering::SeqCst) && !cooldown.is_zero() {
                tracing::warn!(
                    "{} reported rate limiting, cooling down for {:?}",
                    checker.platform(),
                    cooldown
                );
                tokio::time::sleep(cooldown).await;
            }

            let result = checker.check(&link).await;
            if result.is_rate_limited {
                throttled.store(true, Ordering::SeqCst);
            }
            LinkReport { link, result }
        }
    }))
    .buffer_unordered(config.batch.parallelism as usize)
    .collect()
    .await;

    BatchReport {
        checked_at: Utc::now(),
        results,
    }
}

/// Prints results as a human-readable table with summary counts
fn print_table(results: &[LinkReport]) {
    println!(
        "{:<60} {:<8} {:>10}  {}",
        "LINK", "STATUS", "DURATION", "REASON"
    );
    println!("{}", "=".repeat(100));

    for report in results {
        let status = if report.result.valid { "ok" } else { "dead" };
        let link: String = if report.link.chars().count() > 57 {
            let head: String = report.link.chars().take(57).collect();
            format!("{}...", head)
        } else {
            report.link.clone()
        };

        println!(
            "{:<60} {:<8} {:>8}ms  {}",
            link, status, report.result.duration_ms, report.result.failure_reason
        );
    }

    println!();

    let valid = results.iter().filter(|r| r.result.valid).count();
    let rate_limited = results.iter().filter(|r| r.result.is_rate_limited).count();

    println!("Summary:");
    println!("  valid: {}", valid);
    println!("  invalid: {}", results.len() - valid);
    println!("  rate limited: {}", rate_limited);
    println!("  total: {}", results.len());
}
