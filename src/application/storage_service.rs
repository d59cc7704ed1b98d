use bytes::Bytes;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

use crate::application::backend_config::ConfigError;
use crate::application::factory::ProviderFactory;
use crate::application::ports::{BlobReader, SettingsStore, StorageError, StorageProvider};
use crate::domain::value_objects::ArtifactLocation;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Storage is not configured correctly")]
    Config(#[from] ConfigError),

    #[error("Upload of {name}@{version} failed")]
    Upload {
        name: String,
        version: String,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    /// Underlying storage failure, if the provider was reached
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            ServiceError::Upload { source, .. } => Some(source),
            ServiceError::Config(_) => None,
        }
    }

    /// Whether the caller sent bad input (bad coordinates, bad archive)
    pub fn is_client_error(&self) -> bool {
        self.storage_error()
            .map(StorageError::is_client_error)
            .unwrap_or(false)
    }
}

/// Entry point for uploading remote bundles.
///
/// Meant to live for one request scope: the provider is built from the
/// settings snapshot on first use and reused for the rest of the service's
/// lifetime, so configuration changes apply to the next service.
pub struct StorageService {
    factory: Arc<ProviderFactory>,
    settings: Arc<dyn SettingsStore>,
    provider: OnceCell<Arc<dyn StorageProvider>>,
}

impl StorageService {
    pub fn new(factory: Arc<ProviderFactory>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            factory,
            settings,
            provider: OnceCell::new(),
        }
    }

    /// Service bound to an already built provider
    pub fn with_provider(
        factory: Arc<ProviderFactory>,
        settings: Arc<dyn SettingsStore>,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            factory,
            settings,
            provider: OnceCell::with_value(provider),
        }
    }

    fn provider(&self) -> Result<&Arc<dyn StorageProvider>, ServiceError> {
        self.provider
            .get_or_try_init(|| self.factory.create(self.settings.as_ref()))
            .map_err(|e| {
                error!(error = %e, "Failed to create storage provider");
                ServiceError::Config(e)
            })
    }

    /// Store `stream` (a zip archive) as version `version` of remote `name`
    pub async fn upload(
        &self,
        name: &str,
        version: &str,
        mut stream: BlobReader,
    ) -> Result<ArtifactLocation, ServiceError> {
        let provider = self.provider()?;
        let upload_error = |source: StorageError| ServiceError::Upload {
            name: name.to_string(),
            version: version.to_string(),
            source,
        };

        // The zip central directory sits at the end, so the whole payload is buffered
        let mut buffer = Vec::new();
        if let Err(e) = stream.read_to_end(&mut buffer).await {
            warn!(name, version, error = %e, "Failed to read upload stream");
            return Err(upload_error(StorageError::Validation(format!(
                "Could not read upload body: {}",
                e
            ))));
        }

        match provider
            .upload_archive(name, version, Bytes::from(buffer))
            .await
        {
            Ok(location) => {
                info!(
                    name,
                    version,
                    backend = %provider.kind(),
                    url = %location,
                    "Remote uploaded"
                );
                Ok(location)
            }
            Err(e) => {
                match &e {
                    StorageError::BackendFailure { .. } => {
                        error!(name, version, backend = %provider.kind(), error = %e, "Remote upload failed")
                    }
                    StorageError::PathEscape { entry } => {
                        warn!(name, version, entry = %entry, security_event = true, "Remote upload rejected")
                    }
                    _ => info!(name, version, error = %e, "Remote upload rejected"),
                }
                Err(upload_error(e))
            }
        }
    }
}
