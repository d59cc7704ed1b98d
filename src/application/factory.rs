use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(test)]
use mockall::{automock, predicate::*};
use tracing::info;

use crate::application::backend_config::{
    AzureStorageConfig, ConfigError, LocalStorageConfig, S3StorageConfig, StorageBackendConfig,
};
use crate::application::ports::{SettingsStore, StorageProvider};

/// Builds concrete providers for a decoded backend configuration.
///
/// Implementations must not perform network I/O while building; clients
/// connect lazily on first upload.
#[cfg_attr(test, automock)]
pub trait BackendConnector: Send + Sync {
    fn filesystem(
        &self,
        config: &LocalStorageConfig,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError>;

    fn object_store(&self, config: &S3StorageConfig)
        -> Result<Arc<dyn StorageProvider>, ConfigError>;

    fn blob_store(
        &self,
        config: &AzureStorageConfig,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError>;
}

/// Chooses and instantiates the storage provider selected by configuration
pub struct ProviderFactory {
    connector: Arc<dyn BackendConnector>,
    content_root: PathBuf,
}

impl ProviderFactory {
    pub fn new(connector: Arc<dyn BackendConnector>, content_root: PathBuf) -> Self {
        Self {
            connector,
            content_root,
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Decode the backend from `settings` and build its provider
    pub fn create(
        &self,
        settings: &dyn SettingsStore,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError> {
        let config = StorageBackendConfig::from_settings(settings, &self.content_root)?;
        self.create_from_config(&config)
    }

    /// Build the provider for an already decoded configuration
    pub fn create_from_config(
        &self,
        config: &StorageBackendConfig,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError> {
        let provider = match config {
            StorageBackendConfig::Local(local) => self.connector.filesystem(local)?,
            StorageBackendConfig::S3(s3) => self.connector.object_store(s3)?,
            StorageBackendConfig::Azure(azure) => self.connector.blob_store(azure)?,
        };

        info!(backend = %provider.kind(), "Storage provider created");
        Ok(provider)
    }
}
