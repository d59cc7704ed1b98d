use bytes::Bytes;
use std::io::{Cursor, Read};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

/// Largest decompressed size accepted for a single archive entry
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{0}")]
    Malformed(String),

    #[error("Archive entry {entry:?} escapes the extraction root")]
    PathEscape { entry: String },
}

/// One file extracted from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// `/`-separated path relative to the version root, top-level folder stripped
    pub relative_path: String,
    pub contents: Bytes,
}

#[derive(Debug, Clone)]
struct PlannedEntry {
    index: usize,
    relative_path: String,
}

/// Opens zip payloads and plans their extraction
pub struct ArchiveIngestor;

impl ArchiveIngestor {
    /// Open `archive` and validate every entry path.
    ///
    /// All entry names are checked before anything is returned, so a single
    /// escaping entry rejects the whole archive and nothing gets extracted.
    pub fn ingest(archive: Bytes) -> Result<IngestedArchive, ArchiveError> {
        Self::ingest_with_limit(archive, DEFAULT_MAX_ENTRY_BYTES)
    }

    /// Like [`ArchiveIngestor::ingest`], refusing entries that decompress
    /// past `max_entry_bytes`
    pub fn ingest_with_limit(
        archive: Bytes,
        max_entry_bytes: u64,
    ) -> Result<IngestedArchive, ArchiveError> {
        let mut zip = ZipArchive::new(Cursor::new(archive))
            .map_err(|e| ArchiveError::Malformed(format!("Not a readable zip archive: {}", e)))?;

        let mut planned = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let raw_name = zip
                .by_index_raw(index)
                .map_err(|e| {
                    ArchiveError::Malformed(format!("Unreadable entry #{}: {}", index, e))
                })?
                .name()
                .to_string();

            match Self::plan_entry(&raw_name)? {
                Some(relative_path) => planned.push(PlannedEntry {
                    index,
                    relative_path,
                }),
                None => debug!(entry = %raw_name, "Skipping archive entry"),
            }
        }

        Ok(IngestedArchive {
            zip,
            planned,
            max_entry_bytes,
        })
    }

    /// Compute the extraction path for a raw entry name.
    ///
    /// Returns `Ok(None)` for junk entries (`__MACOSX/`, `._*`, `.gitkeep`,
    /// directory markers) and `PathEscape` for anything that would resolve
    /// outside the extraction root or onto the root itself.
    pub fn plan_entry(raw_name: &str) -> Result<Option<String>, ArchiveError> {
        let name = raw_name.replace('\\', "/");

        if name.starts_with("__MACOSX/") {
            return Ok(None);
        }

        let base_name = name.rsplit('/').next().unwrap_or_default();
        if base_name.is_empty() || base_name.starts_with("._") || base_name == ".gitkeep" {
            return Ok(None);
        }

        let escape = || ArchiveError::PathEscape {
            entry: raw_name.to_string(),
        };

        // The raw name must stay inside the root too, or `../x` would be
        // silently clamped to `x` by the wrapper stripping below
        if is_rooted(&name) || normalize_within_root(&name).is_none() {
            return Err(escape());
        }

        // A single wrapping folder is discarded; files at the archive root stay as-is
        let adjusted = match name.split_once('/') {
            Some((_, rest)) => rest,
            None => name.as_str(),
        };

        normalize_within_root(adjusted).map(Some).ok_or_else(escape)
    }
}

/// `/abs`, `C:...` and `//server` style names
fn is_rooted(name: &str) -> bool {
    let bytes = name.as_bytes();
    name.starts_with('/') || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Lexically resolve `path` against an abstract root.
///
/// Returns `None` when a `..` climbs above the root or the result is the
/// root itself.
fn normalize_within_root(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// A zip archive whose entry paths have all been validated
pub struct IngestedArchive {
    zip: ZipArchive<Cursor<Bytes>>,
    planned: Vec<PlannedEntry>,
    max_entry_bytes: u64,
}

impl IngestedArchive {
    /// Number of entries that survive filtering
    pub fn len(&self) -> usize {
        self.planned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }

    /// Planned relative paths, in archive order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.planned.iter().map(|p| p.relative_path.as_str())
    }

    /// Decompress entries one at a time
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            zip: &mut self.zip,
            planned: self.planned.iter(),
            max_entry_bytes: self.max_entry_bytes,
        }
    }
}

impl std::fmt::Debug for IngestedArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestedArchive")
            .field("entries", &self.planned)
            .finish()
    }
}

/// Lazy iterator over the contents of an [`IngestedArchive`]
pub struct Entries<'a> {
    zip: &'a mut ZipArchive<Cursor<Bytes>>,
    planned: std::slice::Iter<'a, PlannedEntry>,
    max_entry_bytes: u64,
}

impl Iterator for Entries<'_> {
    type Item = Result<ArchiveEntry, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let planned = self.planned.next()?;
        Some(read_entry(self.zip, planned, self.max_entry_bytes))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.planned.size_hint()
    }
}

fn read_entry(
    zip: &mut ZipArchive<Cursor<Bytes>>,
    planned: &PlannedEntry,
    max_entry_bytes: u64,
) -> Result<ArchiveEntry, ArchiveError> {
    let too_large = || {
        ArchiveError::Malformed(format!(
            "{} decompresses past the {} byte entry limit",
            planned.relative_path, max_entry_bytes
        ))
    };

    let mut file = zip.by_index(planned.index).map_err(|e| {
        ArchiveError::Malformed(format!("Cannot open {}: {}", planned.relative_path, e))
    })?;
    if file.size() > max_entry_bytes {
        return Err(too_large());
    }

    // The declared size can lie, so the read itself is capped one byte past the limit
    let mut contents = Vec::new();
    Read::take(&mut file, max_entry_bytes.saturating_add(1))
        .read_to_end(&mut contents)
        .map_err(|e| {
            ArchiveError::Malformed(format!("Cannot read {}: {}", planned.relative_path, e))
        })?;
    if contents.len() as u64 > max_entry_bytes {
        return Err(too_large());
    }

    Ok(ArchiveEntry {
        relative_path: planned.relative_path.clone(),
        contents: Bytes::from(contents),
    })
}
