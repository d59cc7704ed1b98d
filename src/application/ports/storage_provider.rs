use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::{automock, predicate::*};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::application::archive::ArchiveError;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ArtifactLocation, BackendKind};

/// Boxed error from a storage SDK or the OS
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for the async reader carrying an uploaded archive
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed archive: {0}")]
    Malformed(String),

    #[error("Archive entry {entry:?} escapes the artifact directory")]
    PathEscape { entry: String },

    #[error("Storage backend failure while {context}: {source}")]
    BackendFailure {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    pub fn backend(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::BackendFailure {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Whether the failure was caused by the uploaded data rather than the backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::Validation(_) | StorageError::Malformed(_) | StorageError::PathEscape { .. }
        )
    }
}

impl From<DomainError> for StorageError {
    fn from(err: DomainError) -> Self {
        StorageError::Validation(err.to_string())
    }
}

impl From<ArchiveError> for StorageError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Malformed(reason) => StorageError::Malformed(reason),
            ArchiveError::PathEscape { entry } => StorageError::PathEscape { entry },
        }
    }
}

/// Port for a backend that persists remote bundles
///
/// Implementations validate `name` and `version` before touching the
/// backend, ingest the zip through the shared archive ingestor and write
/// every entry under `{name}/{version}/`. The returned location always ends
/// in `/{name}/{version}/remoteEntry.js`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Backend this provider writes to
    fn kind(&self) -> BackendKind;

    /// Unpack `archive` as version `version` of remote `name`
    async fn upload_archive(
        &self,
        name: &str,
        version: &str,
        archive: Bytes,
    ) -> Result<ArtifactLocation, StorageError>;
}
