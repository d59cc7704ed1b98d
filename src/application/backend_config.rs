//! Storage backend configuration decoded from the key-value settings store
//!
//! Decoding happens once per `StorageService`; every key the selected
//! backend needs is read eagerly so a missing credential surfaces as a
//! [`ConfigError`] before any upload is attempted.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::application::ports::SettingsStore;
use crate::domain::value_objects::BackendKind;

/// Setting keys read by the storage subsystem
pub mod keys {
    pub const STORAGE_TYPE: &str = "storage:type";
    pub const STORAGE_PATH: &str = "storage:path";
    pub const API_BASE_URL: &str = "api:base_url";
    pub const LOCAL_STAGED: &str = "storage:local:staged";

    pub const AZURE_CONNECTION_STRING: &str = "storage:azure:connection_string";
    pub const AZURE_CONTAINER_NAME: &str = "storage:azure:container_name";

    pub const AWS_BUCKET: &str = "storage:aws:bucket";
    pub const AWS_REGION: &str = "storage:aws:region";
    pub const AWS_ACCESS_KEY: &str = "storage:aws:access_key";
    pub const AWS_SECRET_KEY: &str = "storage:aws:secret_key";
    pub const AWS_ENDPOINT: &str = "storage:aws:endpoint";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration key: {key}")]
    MissingKey { key: String },

    #[error("Invalid value for configuration key {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to load settings from {path}: {reason}")]
    Source { path: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Local filesystem backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStorageConfig {
    /// Application content root; relative storage paths resolve against it
    pub content_root: PathBuf,
    /// Raw `storage:path` value, if configured
    pub storage_path: Option<String>,
    /// Public API base URL (`api:base_url`)
    pub public_base_url: String,
    /// Write into a staging directory and swap it into place on success
    pub staged_writes: bool,
}

/// Azure Blob Storage backend settings
#[derive(Clone, PartialEq, Eq)]
pub struct AzureStorageConfig {
    pub connection_string: String,
    pub container_name: String,
}

impl std::fmt::Debug for AzureStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureStorageConfig")
            .field("connection_string", &"<redacted>")
            .field("container_name", &self.container_name)
            .finish()
    }
}

/// S3 backend settings
#[derive(Clone, PartialEq, Eq)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// S3-compatible endpoint (MinIO, R2, ...). Switches to path-style addressing.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for S3StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Backend selection with all settings it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendConfig {
    Local(LocalStorageConfig),
    Azure(AzureStorageConfig),
    S3(S3StorageConfig),
}

impl StorageBackendConfig {
    /// Decode the backend selected by `storage:type`
    pub fn from_settings(
        settings: &dyn SettingsStore,
        content_root: &Path,
    ) -> Result<Self, ConfigError> {
        let raw_kind = required(settings, keys::STORAGE_TYPE)?;
        let kind = raw_kind.parse::<BackendKind>().map_err(|_| {
            ConfigError::invalid(
                keys::STORAGE_TYPE,
                format!("expected one of local, azure, aws; got {:?}", raw_kind),
            )
        })?;

        match kind {
            BackendKind::Local => Ok(Self::Local(LocalStorageConfig {
                content_root: content_root.to_path_buf(),
                storage_path: optional(settings, keys::STORAGE_PATH),
                public_base_url: http_url(settings, keys::API_BASE_URL, true)?
                    .unwrap_or_default(),
                staged_writes: flag(settings, keys::LOCAL_STAGED, true)?,
            })),
            BackendKind::Azure => {
                let connection_string = required(settings, keys::AZURE_CONNECTION_STRING)?;
                let container_name = required(settings, keys::AZURE_CONTAINER_NAME)?;
                validate_container_name(&container_name)?;

                Ok(Self::Azure(AzureStorageConfig {
                    connection_string,
                    container_name,
                }))
            }
            BackendKind::Aws => Ok(Self::S3(S3StorageConfig {
                bucket: required(settings, keys::AWS_BUCKET)?,
                region: required(settings, keys::AWS_REGION)?,
                access_key: required(settings, keys::AWS_ACCESS_KEY)?,
                secret_key: required(settings, keys::AWS_SECRET_KEY)?,
                endpoint: http_url(settings, keys::AWS_ENDPOINT, false)?,
            })),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StorageBackendConfig::Local(_) => BackendKind::Local,
            StorageBackendConfig::Azure(_) => BackendKind::Azure,
            StorageBackendConfig::S3(_) => BackendKind::Aws,
        }
    }
}

/// Trimmed, non-empty value of `key`
fn optional(settings: &dyn SettingsStore, key: &str) -> Option<String> {
    settings
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(settings: &dyn SettingsStore, key: &str) -> Result<String, ConfigError> {
    optional(settings, key).ok_or_else(|| ConfigError::MissingKey {
        key: key.to_string(),
    })
}

fn flag(settings: &dyn SettingsStore, key: &str, default: bool) -> Result<bool, ConfigError> {
    match optional(settings, key) {
        None => Ok(default),
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::invalid(key, "expected true or false")),
        },
    }
}

/// An http(s) URL without trailing slash
fn http_url(
    settings: &dyn SettingsStore,
    key: &str,
    is_required: bool,
) -> Result<Option<String>, ConfigError> {
    let value = if is_required {
        Some(required(settings, key)?)
    } else {
        optional(settings, key)
    };

    match value {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            Ok(Some(url.trim_end_matches('/').to_string()))
        }
        Some(_) => Err(ConfigError::invalid(
            key,
            "must start with http:// or https://",
        )),
        None => Ok(None),
    }
}

/// Azure container names: 3-63 chars of lowercase letters, digits and single hyphens
fn validate_container_name(name: &str) -> Result<(), ConfigError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_shape = !name.starts_with('-') && !name.ends_with('-') && !name.contains("--");

    if (3..=63).contains(&name.len()) && valid_chars && valid_shape {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            keys::AZURE_CONTAINER_NAME,
            "must be 3-63 lowercase letters, digits or single hyphens",
        ))
    }
}
