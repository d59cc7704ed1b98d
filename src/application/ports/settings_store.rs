use std::sync::Arc;

#[cfg(test)]
use mockall::{automock, predicate::*};

use crate::application::backend_config::ConfigError;

/// Read-only view of the key-value configuration store (`storage:type`, `api:base_url`, ...)
#[cfg_attr(test, automock)]
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Produces a fresh settings snapshot for every request scope
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> Result<Arc<dyn SettingsStore>, ConfigError>;
}

impl SettingsStore for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key).cloned()
    }
}
