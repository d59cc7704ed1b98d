use std::path::PathBuf;

use crate::api::middleware::size_limits::DEFAULT_MAX_UPLOAD_BYTES;

/// Process-level service configuration
///
/// Storage backend selection lives in the key-value settings store
/// (`SETTINGS_FILE` plus `STORAGE__*` / `API__*` environment variables).
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Root that relative `storage:path` values resolve against
    pub content_root: PathBuf,
    /// Optional TOML file backing the settings store
    pub settings_file: Option<PathBuf>,
    pub max_upload_bytes: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            content_root: std::env::var("CONTENT_ROOT")
                .map(PathBuf::from)
                .or_else(|_| std::env::current_dir())
                .unwrap_or_else(|_| PathBuf::from(".")),
            settings_file: std::env::var("SETTINGS_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("LISTEN_ADDR cannot be empty".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }

        if let Some(path) = &self.settings_file {
            if !path.is_file() {
                return Err(format!("SETTINGS_FILE {} does not exist", path.display()));
            }
        }

        Ok(())
    }
}
