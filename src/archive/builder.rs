//! Zip archive assembly and delivery

use crate::archive::{ArchiveError, ArchiveResult};
use crate::bundler::Collection;
use crate::config::Compression;
use std::collections::HashMap;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What was written to an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Where the archive was saved, if it went to a file
    pub path: Option<PathBuf>,

    /// Member names in archive order
    pub members: Vec<String>,

    /// Entries whose name was already taken and replaced an earlier entry
    pub overwritten: usize,

    /// Sum of uncompressed member sizes
    pub total_bytes: u64,
}

/// One archive member after name collisions are resolved
struct Member<'a> {
    name: &'a str,
    data: &'a [u8],
}

/// Builds a flat zip archive from a run's collection
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveBuilder {
    compression: Compression,
}

impl ArchiveBuilder {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    /// Resolves name collisions
    ///
    /// Each name appears once, at the position where it was first seen,
    /// holding the data of the last entry with that name.
    fn plan(collection: &Collection) -> (Vec<Member<'_>>, usize) {
        let mut members: Vec<Member<'_>> = Vec::with_capacity(collection.len());
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut overwritten = 0;

        for (name, data) in collection.entries() {
            match positions.get(name) {
                Some(&index) => {
                    tracing::debug!("Archive member '{}' replaced by a later entry", name);
                    members[index].data = data;
                    overwritten += 1;
                }
                None => {
                    positions.insert(name, members.len());
                    members.push(Member { name, data });
                }
            }
        }

        (members, overwritten)
    }

    fn file_options(&self) -> FileOptions {
        let method = match self.compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        };

        FileOptions::default()
            .compression_method(method)
            .unix_permissions(0o644)
    }

    /// Writes the archive to any seekable sink
    pub fn write_to<W: Write + Seek>(
        &self,
        collection: &Collection,
        writer: W,
    ) -> ArchiveResult<ArchiveSummary> {
        let (members, overwritten) = Self::plan(collection);
        let options = self.file_options();
        let mut zip = ZipWriter::new(writer);
        let mut total_bytes = 0u64;

        for member in &members {
            zip.start_file(member.name, options)?;
            zip.write_all(member.data)?;
            total_bytes += member.data.len() as u64;
        }

        zip.finish()?;

        Ok(ArchiveSummary {
            path: None,
            members: members.iter().map(|m| m.name.to_string()).collect(),
            overwritten,
            total_bytes,
        })
    }

    /// Writes the archive to `path`
    ///
    /// The archive is built in a temporary file next to `path` and renamed
    /// into place, so a failed build leaves no partial file behind.
    pub fn save(&self, collection: &Collection, path: &Path) -> ArchiveResult<ArchiveSummary> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut staging = tempfile::NamedTempFile::new_in(dir)?;
        let mut summary = self.write_to(collection, staging.as_file_mut())?;

        staging.persist(path).map_err(|e| ArchiveError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;

        tracing::info!(
            "Wrote {} ({} members, {} bytes uncompressed)",
            path.display(),
            summary.members.len(),
            summary.total_bytes
        );

        summary.path = Some(path.to_path_buf());
        Ok(summary)
    }
}
