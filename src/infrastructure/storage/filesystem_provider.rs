use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::archive::ArchiveUpload;
use crate::application::backend_config::LocalStorageConfig;
use crate::application::ports::{StorageError, StorageProvider};
use crate::domain::value_objects::{ArtifactCoordinates, ArtifactLocation, BackendKind};
use crate::infrastructure::storage::PathBuilder;

/// Route under which the API serves the local storage directory
pub const REMOTES_ROUTE: &str = "/remotes";

/// Local filesystem provider.
///
/// With staged writes (the default) an upload is extracted into a scratch
/// directory next to the served tree and swapped into `{base}/{name}/{version}`
/// only once every entry is on disk, so a failed upload never leaves a half-written
/// version behind. Without staging, entries are written straight into the
/// version directory and overwrite whatever is there.
pub struct FilesystemProvider {
    path_builder: PathBuilder,
    public_base_url: String,
    staged_writes: bool,
}

impl FilesystemProvider {
    pub fn new(config: &LocalStorageConfig) -> Self {
        Self::with_options(
            PathBuilder::from_config(config),
            config.public_base_url.clone(),
            config.staged_writes,
        )
    }

    pub fn with_options(
        path_builder: PathBuilder,
        public_base_url: String,
        staged_writes: bool,
    ) -> Self {
        Self {
            path_builder,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            staged_writes,
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.path_builder.base_dir()
    }

    fn location(&self, coordinates: &ArtifactCoordinates) -> ArtifactLocation {
        ArtifactLocation::under(
            &format!("{}{}", self.public_base_url, REMOTES_ROUTE),
            coordinates,
        )
    }

    async fn write_in_place(&self, upload: &mut ArchiveUpload) -> Result<usize, StorageError> {
        let version_dir = self.path_builder.version_dir(upload.coordinates());
        write_entries(&version_dir, upload).await
    }

    async fn write_staged(&self, upload: &mut ArchiveUpload) -> Result<usize, StorageError> {
        let coordinates = upload.coordinates().clone();
        let staging_dir = self.path_builder.staging_dir(&coordinates, Uuid::new_v4());

        let result = match write_entries(&staging_dir, upload).await {
            Ok(written) => self
                .swap_into_place(&staging_dir, &coordinates)
                .await
                .map(|_| written),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = fs::remove_dir_all(&staging_dir).await {
                if e.kind() != ErrorKind::NotFound {
                    warn!(
                        path = %staging_dir.display(),
                        error = %e,
                        "Failed to clean up staging directory"
                    );
                }
            }
        }

        result
    }

    /// Replace the published version directory with `staging_dir`
    async fn swap_into_place(
        &self,
        staging_dir: &Path,
        coordinates: &ArtifactCoordinates,
    ) -> Result<(), StorageError> {
        let name_dir = self.path_builder.name_dir(coordinates);
        let version_dir = self.path_builder.version_dir(coordinates);
        let retired_dir = self.path_builder.retired_dir(coordinates, Uuid::new_v4());

        fs::create_dir_all(&name_dir)
            .await
            .map_err(|e| StorageError::backend(format!("creating {}", name_dir.display()), e))?;

        let replaced = match fs::rename(&version_dir, &retired_dir).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                return Err(StorageError::backend(
                    format!("retiring {}", version_dir.display()),
                    e,
                ))
            }
        };

        if let Err(e) = fs::rename(staging_dir, &version_dir).await {
            if replaced {
                return Err(restore_previous(&retired_dir, &version_dir, e).await);
            }
            return Err(StorageError::backend(
                format!("publishing {}", version_dir.display()),
                e,
            ));
        }

        if replaced {
            debug!(artifact = %coordinates, "Replaced previous version");
            if let Err(e) = fs::remove_dir_all(&retired_dir).await {
                warn!(
                    path = %retired_dir.display(),
                    error = %e,
                    "Failed to remove replaced version directory"
                );
            }
        }

        Ok(())
    }
}

/// Move a retired version back after its replacement failed to publish.
///
/// Returns the error to report. When the restore itself fails the previous
/// version is left at `retired_dir`, and that path is named in the error.
async fn restore_previous(
    retired_dir: &Path,
    version_dir: &Path,
    publish_error: std::io::Error,
) -> StorageError {
    match fs::rename(retired_dir, version_dir).await {
        Ok(()) => StorageError::backend(
            format!("publishing {}", version_dir.display()),
            publish_error,
        ),
        Err(restore_error) => {
            error!(
                path = %version_dir.display(),
                retired = %retired_dir.display(),
                publish_error = %publish_error,
                error = %restore_error,
                "Could not restore previous version, it remains in the retired directory"
            );
            StorageError::backend(
                format!(
                    "publishing {} (previous version left at {}, publish error: {})",
                    version_dir.display(),
                    retired_dir.display(),
                    publish_error
                ),
                restore_error,
            )
        }
    }
}

/// Write every ingested entry under `dir`, creating directories as needed
async fn write_entries(dir: &Path, upload: &mut ArchiveUpload) -> Result<usize, StorageError> {
    // create_dir_all tolerates concurrent creators
    fs::create_dir_all(dir)
        .await
        .map_err(|e| StorageError::backend(format!("creating {}", dir.display()), e))?;

    let mut written = 0;
    for entry in upload.entries() {
        let entry = entry?;
        let destination = PathBuilder::entry_path(dir, &entry.relative_path);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::backend(format!("creating directory for {}", entry.relative_path), e)
            })?;
        }

        fs::write(&destination, &entry.contents)
            .await
            .map_err(|e| StorageError::backend(format!("writing {}", entry.relative_path), e))?;

        debug!(
            entry = %entry.relative_path,
            size = entry.contents.len(),
            "Wrote archive entry"
        );
        written += 1;
    }

    Ok(written)
}

#[async_trait]
impl StorageProvider for FilesystemProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn upload_archive(
        &self,
        name: &str,
        version: &str,
        archive: Bytes,
    ) -> Result<ArtifactLocation, StorageError> {
        let mut upload = ArchiveUpload::prepare(name, version, archive)?;

        let written = if self.staged_writes {
            self.write_staged(&mut upload).await?
        } else {
            self.write_in_place(&mut upload).await?
        };

        let coordinates = upload.coordinates();
        info!(
            artifact = %coordinates,
            files = written,
            path = %self.path_builder.version_dir(coordinates).display(),
            "Stored remote on local filesystem"
        );

        Ok(self.location(coordinates))
    }
}
