use async_trait::async_trait;
use bytes::Bytes;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::info;

use crate::application::archive::ArchiveUpload;
use crate::application::backend_config::{AzureStorageConfig, ConfigError};
use crate::application::ports::{ContainerAdmin, StorageError, StorageProvider};
use crate::domain::value_objects::{ArtifactLocation, BackendKind};
use crate::infrastructure::storage::azure_connection::AzureConnectionString;
use crate::infrastructure::storage::azure_container_admin::SharedKeyContainerAdmin;
use crate::infrastructure::storage::object_writer::put_entries;

/// Azure Blob Storage provider. Creates its container on demand.
pub struct BlobStoreProvider {
    store: Arc<dyn ObjectStore>,
    admin: Arc<dyn ContainerAdmin>,
    container_name: String,
    public_base_url: String,
}

impl BlobStoreProvider {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        admin: Arc<dyn ContainerAdmin>,
        container_name: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            admin,
            container_name: container_name.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Build the blob client from a connection string. Nothing is sent until the first upload.
    pub fn from_config(config: &AzureStorageConfig) -> Result<Self, ConfigError> {
        let connection: AzureConnectionString = config.connection_string.parse()?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(connection.account_name.clone())
            .with_access_key(connection.account_key.clone())
            .with_container_name(config.container_name.clone());

        if connection.custom_endpoint {
            builder = builder
                .with_endpoint(connection.blob_endpoint.clone())
                .with_allow_http(connection.blob_endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| ConfigError::invalid("storage:azure", e.to_string()))?;

        let public_base_url = connection.container_url(&config.container_name);
        let admin = SharedKeyContainerAdmin::new(connection)?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(admin),
            config.container_name.clone(),
            public_base_url,
        ))
    }
}

#[async_trait]
impl StorageProvider for BlobStoreProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Azure
    }

    async fn upload_archive(
        &self,
        name: &str,
        version: &str,
        archive: Bytes,
    ) -> Result<ArtifactLocation, StorageError> {
        let mut upload = ArchiveUpload::prepare(name, version, archive)?;

        self.admin.ensure_container(&self.container_name).await?;
        let written = put_entries(self.store.as_ref(), &mut upload).await?;

        let coordinates = upload.coordinates();
        info!(
            artifact = %coordinates,
            container = %self.container_name,
            blobs = written,
            "Stored remote in blob storage"
        );

        Ok(ArtifactLocation::under(&self.public_base_url, coordinates))
    }
}
