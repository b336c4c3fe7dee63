//! Resource collector: concurrent scatter/gather over located assets
//!
//! Every located asset gets its own fetch; all fetches are polled together
//! from one task and the collector only returns once each has settled.
//! Failures are logged and dropped, never propagated.

use crate::bundler::fetcher::{fetch_url, FetchResult};
use crate::bundler::locator::{AssetKind, Bucket, LocatedAsset};
use crate::url::leaf_name;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fixed archive name of the root document
pub const ROOT_DOCUMENT_NAME: &str = "index.html";

/// One HTML, CSS or JS file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub name: String,
    pub content: String,
}

/// One image, audio, video, vector graphic or icon file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Body of a successfully fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// Everything collected by one run
///
/// Buckets are append-only and may hold several entries with the same name;
/// the archive builder resolves those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub html: Vec<TextEntry>,
    pub css: Vec<TextEntry>,
    pub js: Vec<TextEntry>,
    pub assets: Vec<BinaryEntry>,
}

impl Collection {
    /// Creates a collection holding only the root document
    pub fn new(root_document: String) -> Self {
        Self {
            html: vec![TextEntry {
                name: ROOT_DOCUMENT_NAME.to_string(),
                content: root_document,
            }],
            css: Vec::new(),
            js: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// Appends a fetched resource to the bucket for its kind
    pub fn append(&mut self, kind: AssetKind, name: String, payload: Payload) {
        match kind.bucket() {
            Bucket::Html => self.html.push(TextEntry {
                name,
                content: payload.into_text(),
            }),
            Bucket::Css => self.css.push(TextEntry {
                name,
                content: payload.into_text(),
            }),
            Bucket::Js => self.js.push(TextEntry {
                name,
                content: payload.into_text(),
            }),
            Bucket::Binary => self.assets.push(BinaryEntry {
                name,
                data: payload.into_bytes(),
            }),
        }
    }

    /// Total number of entries across all buckets
    pub fn len(&self) -> usize {
        self.html.len() + self.css.len() + self.js.len() + self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates all entries as (name, bytes): HTML, CSS, JS, then binary
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.html
            .iter()
            .chain(&self.css)
            .chain(&self.js)
            .map(|entry| (entry.name.as_str(), entry.content.as_bytes()))
            .chain(
                self.assets
                    .iter()
                    .map(|entry| (entry.name.as_str(), entry.data.as_slice())),
            )
    }
}

/// A subresource that could not be collected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: AssetKind,
    pub url: Url,
    pub reason: String,
}

/// Settled result of one subresource fetch
#[derive(Debug)]
pub enum FetchOutcome {
    Collected {
        kind: AssetKind,
        name: String,
        payload: Payload,
    },
    Failed(FetchFailure),
}

/// Summary of one collection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Number of assets the locator handed over
    pub located: usize,

    /// Number of assets appended to the collection
    pub collected: usize,

    /// Assets that were dropped
    pub failures: Vec<FetchFailure>,
}

impl CollectionReport {
    /// True once every located asset has produced an outcome
    pub fn is_settled(&self) -> bool {
        self.collected + self.failures.len() == self.located
    }
}

/// Fetches a single located asset
async fn fetch_asset(client: &Client, asset: LocatedAsset, limit: Duration) -> FetchOutcome {
    let result = fetch_url(client, &asset.url, asset.kind.body_kind(), limit).await;

    let payload = match result {
        FetchResult::Text { body, .. } => Payload::Text(body),
        FetchResult::Binary { body, .. } => Payload::Binary(body),
        failed => {
            return FetchOutcome::Failed(FetchFailure {
                kind: asset.kind,
                reason: failed
                    .failure_reason()
                    .unwrap_or_else(|| "unknown error".to_string()),
                url: asset.url,
            });
        }
    };

    let name = leaf_name(&asset.reference, &asset.url)
        .unwrap_or_else(|| asset.kind.fallback_name().to_string());

    FetchOutcome::Collected {
        kind: asset.kind,
        name,
        payload,
    }
}

/// Fetches every located asset concurrently and appends the successes
///
/// Entries are appended in settlement order. One failing fetch never stops
/// its siblings; the function returns only when all of them have settled.
/// `limit` is the per-fetch stall limit described on [`fetch_url`].
pub async fn collect_resources(
    client: &Client,
    assets: Vec<LocatedAsset>,
    collection: &mut Collection,
    limit: Duration,
) -> CollectionReport {
    let mut report = CollectionReport {
        located: assets.len(),
        ..Default::default()
    };

    let mut in_flight: FuturesUnordered<_> = assets
        .into_iter()
        .map(|asset| fetch_asset(client, asset, limit))
        .collect();

    while let Some(outcome) = in_flight.next().await {
        match outcome {
            FetchOutcome::Collected {
                kind,
                name,
                payload,
            } => {
                tracing::debug!("Collected {} '{}'", kind.as_str(), name);
                collection.append(kind, name, payload);
                report.collected += 1;
            }
            FetchOutcome::Failed(failure) => {
                tracing::warn!(
                    "Error fetching {} {}: {}",
                    failure.kind.as_str(),
                    failure.url,
                    failure.reason
                );
                report.failures.push(failure);
            }
        }
    }

    tracing::info!(
        "Collected {} of {} assets ({} failed)",
        report.collected,
        report.located,
        report.failures.len()
    );

    report
}
