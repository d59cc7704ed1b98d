use std::sync::Arc;

use crate::application::backend_config::{
    AzureStorageConfig, ConfigError, LocalStorageConfig, S3StorageConfig,
};
use crate::application::factory::BackendConnector;
use crate::application::ports::StorageProvider;
use crate::infrastructure::storage::{BlobStoreProvider, FilesystemProvider, ObjectStoreProvider};

/// Connector producing the real filesystem, S3 and Azure providers
#[derive(Debug, Default, Clone, Copy)]
pub struct CloudConnector;

impl BackendConnector for CloudConnector {
    fn filesystem(
        &self,
        config: &LocalStorageConfig,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError> {
        Ok(Arc::new(FilesystemProvider::new(config)))
    }

    fn object_store(
        &self,
        config: &S3StorageConfig,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError> {
        Ok(Arc::new(ObjectStoreProvider::from_config(config)?))
    }

    fn blob_store(
        &self,
        config: &AzureStorageConfig,
    ) -> Result<Arc<dyn StorageProvider>, ConfigError> {
        Ok(Arc::new(BlobStoreProvider::from_config(config)?))
    }
}
