//! Archive module for Web-Code-Bundler
//!
//! This module assembles a run's collection into a single flat zip file:
//! the root document as `index.html` followed by every collected stylesheet,
//! script and binary asset under its leaf name.

mod builder;

use thiserror::Error;

pub use builder::{ArchiveBuilder, ArchiveSummary};

/// Errors that can occur while building or delivering an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to save archive to {path}: {source}")]
    Persist {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
