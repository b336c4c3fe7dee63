//! Web-Code-Bundler main entry point
//!
//! This is the command-line interface for the Web-Code-Bundler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use web_code_bundler::bundler::{build_http_client, fetch_document, locate_assets, Session};
use web_code_bundler::config::load_config_with_hash;
use web_code_bundler::{normalize_input, BundleError, Config, ReferenceScope};

/// Web-Code-Bundler: save a web page and its assets as a zip
///
/// Fetches the page at URL, collects the stylesheets, scripts, images,
/// media and icons it references relatively, and writes everything into a
/// single flat zip archive.
#[derive(Parser, Debug)]
#[command(name = "web-code-bundler")]
#[command(version)]
#[command(about = "Bundle a web page and its assets into a zip", long_about = None)]
struct Cli {
    /// Page to fetch; https:// is assumed when no scheme is given
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the archive (overrides the configuration)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Which references to fetch: prefix or same-origin (overrides the configuration)
    #[arg(long, value_name = "MODE", value_parser = parse_scope)]
    scope: Option<ReferenceScope>,

    /// Fetch the page and list the assets that would be collected, without downloading them
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_scope(value: &str) -> Result<ReferenceScope, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.archive.output_path = output.display().to_string();
    }
    if let Some(scope) = cli.scope {
        config.locator.scope = scope;
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli.url).await
    } else {
        handle_bundle(config, &cli.url, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_code_bundler=info,warn"),
            1 => EnvFilter::new("web_code_bundler=debug,info"),
            2 => EnvFilter::new("web_code_bundler=trace,debug"),
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

/// Maps a run error to the status line shown to the user
fn status_message(error: &BundleError) -> String {
    match error {
        BundleError::InvalidInput => "Error: Please enter a URL".to_string(),
        BundleError::InvalidUrl(_) => "Error: Invalid URL".to_string(),
        BundleError::RootFetchFailed { .. } => "Error: Error fetching the URL".to_string(),
        BundleError::ArchiveFailed(_) => "Error: Failed to create zip file".to_string(),
        other => format!("Error: {}", other),
    }
}

/// Prints the status line for a failed run and picks the exit code
fn report_failure(error: &BundleError) -> ExitCode {
    tracing::error!("Run failed: {}", error);
    eprintln!("{}", status_message(error));
    ExitCode::FAILURE
}

/// Handles the --dry-run mode: fetches the root and lists located assets
async fn handle_dry_run(config: &Config, input: &str) -> anyhow::Result<ExitCode> {
    let base_url = match normalize_input(input) {
        Ok(url) => url,
        Err(e) => return Ok(report_failure(&e)),
    };

    let client = build_http_client(&config.fetcher).context("failed to build HTTP client")?;
    let document = match fetch_document(&client, &base_url, config.fetcher.timeout()).await {
        Ok(document) => document,
        Err(e) => return Ok(report_failure(&e)),
    };

    let assets = locate_assets(&document, &base_url, config.locator.scope);

    println!("=== Web-Code-Bundler Dry Run ===\n");
    println!("Page: {}", base_url);
    println!("Scope: {}", config.locator.scope);
    println!("Archive: {}", config.archive.output_path);
    println!("\nAssets ({}):", assets.len());
    for asset in &assets {
        println!("  - [{}] {}", asset.kind.as_str(), asset.url);
    }

    Ok(ExitCode::SUCCESS)
}

/// Handles the main fetch-and-download operation
async fn handle_bundle(config: Config, input: &str, quiet: bool) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(config).context("failed to start session")?;

    let report = match session.fetch(input).await {
        Ok(report) => report,
        Err(e) => return Ok(report_failure(&e)),
    };

    if !report.failures.is_empty() {
        tracing::info!(
            "{} of {} assets could not be fetched and were left out",
            report.failures.len(),
            report.located
        );
    }

    match session.download() {
        Ok(summary) => {
            if !quiet {
                let path = summary
                    .path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "Zip file created successfully: {} ({} files)",
                    path,
                    summary.members.len()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(&e)),
    }
}
