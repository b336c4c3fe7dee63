//! Web-Code-Bundler: fetch a page and its same-origin subresources into a zip
//!
//! This crate fetches a root HTML document, locates the stylesheets, scripts,
//! images, media and icons it references relatively, fetches them all
//! concurrently, and bundles everything into a flat zip archive.

pub mod archive;
pub mod bundler;
pub mod config;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Web-Code-Bundler operations
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Please enter a URL")]
    InvalidInput,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Error fetching {url}: {reason}")]
    RootFetchFailed { url: String, reason: String },

    #[error("Archive creation failed: {0}")]
    ArchiveFailed(#[from] archive::ArchiveError),

    #[error("Nothing to download: asset collection has not settled (phase: {phase})")]
    NotReady { phase: state::RunPhase },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunPhase,
        to: state::RunPhase,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{input}': {source}")]
    Parse {
        input: String,
        source: ::url::ParseError,
    },
}

/// Result type alias for Web-Code-Bundler operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use archive::{ArchiveBuilder, ArchiveSummary};
pub use bundler::{Collection, Session};
pub use config::Config;
pub use state::RunPhase;
pub use crate::url::{normalize_input, ReferenceScope};
