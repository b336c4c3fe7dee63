//! Bundler module for page and subresource fetching
//!
//! This module contains the core bundling logic, including:
//! - HTTP fetching of the root document and its subresources
//! - HTML parsing and asset reference location
//! - Concurrent collection of every located asset
//! - Whole-run coordination through a `Session`

mod collector;
mod coordinator;
mod fetcher;
mod locator;

pub use collector::{
    collect_resources, BinaryEntry, Collection, CollectionReport, FetchFailure, FetchOutcome,
    Payload, TextEntry, ROOT_DOCUMENT_NAME,
};
pub use coordinator::Session;
pub use fetcher::{build_http_client, fetch_document, fetch_url, BodyKind, FetchResult};
pub use locator::{locate_assets, AssetKind, Bucket, LocatedAsset};

use crate::archive::ArchiveSummary;
use crate::config::Config;
use crate::BundleError;

/// Fetches a page with all its assets and writes the archive
///
/// This is the one-shot entry point used by the command line. It will:
/// 1. Build a session from the configuration
/// 2. Fetch the root document and collect every asset
/// 3. Save the archive to the configured output path
///
/// # Example
///
/// ```no_run
/// use web_code_bundler::bundler::bundle;
/// use web_code_bundler::Config;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (report, summary) = bundle(Config::default(), "example.com").await?;
/// println!("{} assets collected, archive has {} members", report.collected, summary.members.len());
/// # Ok(())
/// # }
/// ```
pub async fn bundle(
    config: Config,
    input: &str,
) -> Result<(CollectionReport, ArchiveSummary), BundleError> {
    let mut session = Session::new(config)?;
    let report = session.fetch(input).await?;
    let summary = session.download()?;
    Ok((report, summary))
}
