use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode, Url};
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, info};

use crate::application::backend_config::ConfigError;
use crate::application::ports::{ContainerAdmin, StorageError};
use crate::infrastructure::storage::azure_connection::AzureConnectionString;

const API_VERSION: &str = "2021-08-06";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type HmacSha256 = Hmac<Sha256>;

/// Creates blob containers with a SharedKey-signed `Create Container` call
pub struct SharedKeyContainerAdmin {
    client: Client,
    connection: AzureConnectionString,
    key: Vec<u8>,
}

impl SharedKeyContainerAdmin {
    pub fn new(connection: AzureConnectionString) -> Result<Self, ConfigError> {
        let key = connection.key_bytes()?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::invalid("storage:azure", e.to_string()))?;

        Ok(Self {
            client,
            connection,
            key,
        })
    }

    fn authorization(&self, date: &str, resource_path: &str) -> Result<String, StorageError> {
        let payload = string_to_sign(date, &self.connection.account_name, resource_path);
        let signature = sign(&self.key, &payload)?;
        Ok(format!(
            "SharedKey {}:{}",
            self.connection.account_name, signature
        ))
    }
}

/// Canonical string for a body-less `PUT ?restype=container`
pub fn string_to_sign(date: &str, account: &str, resource_path: &str) -> String {
    // Verb followed by eleven empty standard headers
    format!(
        "PUT{}x-ms-date:{}\nx-ms-version:{}\n/{}{}\nrestype:container",
        "\n".repeat(12),
        date,
        API_VERSION,
        account,
        resource_path
    )
}

/// Base64 HMAC-SHA256 of `payload` under the decoded account key
pub fn sign(key: &[u8], payload: &str) -> Result<String, StorageError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::backend("signing container request", e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl ContainerAdmin for SharedKeyContainerAdmin {
    async fn ensure_container(&self, container: &str) -> Result<(), StorageError> {
        let mut url = Url::parse(&self.connection.container_url(container))
            .map_err(|e| StorageError::backend("building container URL", e))?;
        let resource_path = url.path().to_string();
        url.query_pairs_mut().append_pair("restype", "container");

        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let authorization = self.authorization(&date, &resource_path)?;

        debug!(container = %container, "Ensuring blob container exists");

        let response = self
            .client
            .put(url)
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION)
            .header("Authorization", authorization)
            .header("Content-Length", "0")
            .send()
            .await
            .map_err(|e| StorageError::backend(format!("creating container {}", container), e))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            debug!(container = %container, "Blob container already exists");
            return Ok(());
        }
        if status.is_success() {
            info!(container = %container, "Created blob container");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(StorageError::backend(
            format!("creating container {}", container),
            format!("unexpected status {}: {}", status, body.trim()),
        ))
    }
}
