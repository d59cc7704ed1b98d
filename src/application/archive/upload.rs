use bytes::Bytes;
use tracing::{debug, warn};

use crate::application::archive::{ArchiveError, ArchiveIngestor, Entries, IngestedArchive};
use crate::application::ports::StorageError;
use crate::domain::value_objects::ArtifactCoordinates;

/// Validated coordinates plus the ingested archive for one upload.
///
/// Every storage provider starts from this value, so name/version
/// validation and the escape checks happen in one place and strictly
/// before any backend I/O.
#[derive(Debug)]
pub struct ArchiveUpload {
    coordinates: ArtifactCoordinates,
    archive: IngestedArchive,
}

impl ArchiveUpload {
    pub fn prepare(name: &str, version: &str, archive: Bytes) -> Result<Self, StorageError> {
        let coordinates = ArtifactCoordinates::parse(name, version).map_err(|e| {
            debug!(name, version, error = %e, "Rejected artifact coordinates");
            StorageError::from(e)
        })?;

        if archive.is_empty() {
            debug!(artifact = %coordinates, "Rejected empty upload");
            return Err(StorageError::Validation(
                "Uploaded archive is empty".to_string(),
            ));
        }

        let archive = ArchiveIngestor::ingest(archive).map_err(|e| {
            match &e {
                ArchiveError::PathEscape { entry } => warn!(
                    security_event = true,
                    artifact = %coordinates,
                    entry = %entry,
                    "Rejected archive with an entry escaping the artifact directory"
                ),
                ArchiveError::Malformed(reason) => {
                    debug!(artifact = %coordinates, reason = %reason, "Rejected malformed archive")
                }
            }
            StorageError::from(e)
        })?;

        debug!(
            artifact = %coordinates,
            entries = archive.len(),
            "Archive ingested"
        );

        Ok(Self {
            coordinates,
            archive,
        })
    }

    pub fn coordinates(&self) -> &ArtifactCoordinates {
        &self.coordinates
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    pub fn entries(&mut self) -> Entries<'_> {
        self.archive.entries()
    }
}
