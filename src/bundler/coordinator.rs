//! Session coordinator - whole-run orchestration
//!
//! A `Session` drives one run at a time through its phases:
//! - Normalizing the user input into a base URL
//! - Fetching the root document
//! - Locating asset references
//! - Collecting every asset concurrently
//! - Building and delivering the archive on demand
//!
//! The collection is owned by the session and replaced on every fetch, so
//! nothing from a previous run leaks into the next archive.

use crate::archive::{ArchiveBuilder, ArchiveResult, ArchiveSummary};
use crate::bundler::collector::{collect_resources, Collection, CollectionReport};
use crate::bundler::fetcher::{build_http_client, fetch_document};
use crate::bundler::locator::locate_assets;
use crate::config::Config;
use crate::state::RunPhase;
use crate::url::normalize_input;
use crate::BundleError;
use reqwest::Client;
use std::io::{Seek, Write};
use std::path::Path;
use url::Url;

/// Owns the HTTP client, the current run phase and the last collection
pub struct Session {
    config: Config,
    client: Client,
    phase: RunPhase,
    base_url: Option<Url>,
    collection: Option<Collection>,
}

impl Session {
    /// Creates a new session
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - Session in the `Idle` phase
    /// * `Err(BundleError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, BundleError> {
        let client = build_http_client(&config.fetcher)?;

        Ok(Self {
            config,
            client,
            phase: RunPhase::Idle,
            base_url: None,
            collection: None,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Base URL of the last successful fetch
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Collection of the last settled run
    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }

    /// Returns true when the download action is enabled
    pub fn can_download(&self) -> bool {
        self.phase.can_download() && self.collection.is_some()
    }

    fn transition(&mut self, next: RunPhase) -> Result<(), BundleError> {
        if !self.phase.can_transition_to(next) {
            return Err(BundleError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Records a terminal failure and hands the error back
    fn fail(&mut self, error: BundleError) -> BundleError {
        if let Err(e) = self.transition(RunPhase::Failed) {
            tracing::error!("Could not mark run as failed: {}", e);
        }
        error
    }

    /// Runs a complete fetch for `input`
    ///
    /// This method:
    /// 1. Discards the previous collection (download is disabled again)
    /// 2. Normalizes the input; empty or malformed input fails here
    /// 3. Fetches the root document; any failure ends the run
    /// 4. Locates asset references in the document
    /// 5. Fetches all assets concurrently and waits for every one to settle
    ///
    /// On success the session is `Ready` and the report describes what was
    /// collected and what was dropped.
    pub async fn fetch(&mut self, input: &str) -> Result<CollectionReport, BundleError> {
        self.transition(RunPhase::Validating)?;
        self.base_url = None;
        self.collection = None;

        let base_url = match normalize_input(input) {
            Ok(url) => url,
            Err(e) => return Err(self.fail(e)),
        };

        let limit = self.config.fetcher.timeout();
        tracing::info!("Fetching {}", base_url);
        self.transition(RunPhase::FetchingRoot)?;
        let document = match fetch_document(&self.client, &base_url, limit).await {
            Ok(document) => document,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(RunPhase::DiscoveringAssets)?;
        let assets = locate_assets(&document, &base_url, self.config.locator.scope);
        tracing::info!("Located {} assets in {}", assets.len(), base_url);

        let mut collection = Collection::new(document);

        self.transition(RunPhase::FetchingAssets)?;
        let report = collect_resources(&self.client, assets, &mut collection, limit).await;

        self.base_url = Some(base_url);
        self.collection = Some(collection);
        self.transition(RunPhase::Ready)?;

        Ok(report)
    }

    /// Runs `build` over the current collection inside the `Archiving` phase
    fn archive_with<F>(&mut self, build: F) -> Result<ArchiveSummary, BundleError>
    where
        F: FnOnce(&ArchiveBuilder, &Collection) -> ArchiveResult<ArchiveSummary>,
    {
        let collection = match (self.phase.can_download(), self.collection.take()) {
            (true, Some(collection)) => collection,
            (_, collection) => {
                self.collection = collection;
                return Err(BundleError::NotReady { phase: self.phase });
            }
        };

        if let Err(e) = self.transition(RunPhase::Archiving) {
            self.collection = Some(collection);
            return Err(e);
        }

        let builder = ArchiveBuilder::new(self.config.archive.compression);
        let result = build(&builder, &collection);
        self.collection = Some(collection);

        match result {
            Ok(summary) => {
                self.transition(RunPhase::Done)?;
                Ok(summary)
            }
            Err(e) => {
                // The collection is kept so the download can be retried
                tracing::error!("Archive creation failed: {}", e);
                self.transition(RunPhase::Ready)?;
                Err(BundleError::ArchiveFailed(e))
            }
        }
    }

    /// Builds the archive into any seekable sink
    pub fn download_to<W: Write + Seek>(&mut self, writer: W) -> Result<ArchiveSummary, BundleError> {
        self.archive_with(|builder, collection| builder.write_to(collection, writer))
    }

    /// Builds the archive and saves it to `path`
    pub fn download_to_path(&mut self, path: &Path) -> Result<ArchiveSummary, BundleError> {
        self.archive_with(|builder, collection| builder.save(collection, path))
    }

    /// Builds the archive and saves it to the configured output path
    pub fn download(&mut self) -> Result<ArchiveSummary, BundleError> {
        let output_path = self.config.archive.output_path.clone();
        self.download_to_path(Path::new(&output_path))
    }
}
