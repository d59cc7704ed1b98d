use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::info;

use crate::application::archive::ArchiveUpload;
use crate::application::backend_config::{ConfigError, S3StorageConfig};
use crate::application::ports::{StorageError, StorageProvider};
use crate::domain::value_objects::{ArtifactLocation, BackendKind};
use crate::infrastructure::storage::object_writer::put_entries;

/// S3 provider. The bucket must already exist.
pub struct ObjectStoreProvider {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl ObjectStoreProvider {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into(),
        }
    }

    /// Build an S3 client from settings. No request is sent until the first upload.
    pub fn from_config(config: &S3StorageConfig) -> Result<Self, ConfigError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| ConfigError::invalid("storage:aws", e.to_string()))?;

        Ok(Self::new(Arc::new(store), Self::public_base_url(config)))
    }

    /// Public URL of the bucket root
    pub fn public_base_url(config: &S3StorageConfig) -> String {
        match &config.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            ),
        }
    }
}

#[async_trait]
impl StorageProvider for ObjectStoreProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Aws
    }

    async fn upload_archive(
        &self,
        name: &str,
        version: &str,
        archive: Bytes,
    ) -> Result<ArtifactLocation, StorageError> {
        let mut upload = ArchiveUpload::prepare(name, version, archive)?;
        let written = put_entries(self.store.as_ref(), &mut upload).await?;

        let coordinates = upload.coordinates();
        info!(artifact = %coordinates, objects = written, "Stored remote in S3");

        Ok(ArtifactLocation::under(&self.public_base_url, coordinates))
    }
}
