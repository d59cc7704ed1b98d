use std::collections::HashMap;

use crate::application::ports::SettingsStore;

/// Settings taken from process environment variables
///
/// `storage:aws:bucket` is read from `STORAGE__AWS__BUCKET`. The environment
/// is captured once at construction.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    vars: HashMap<String, String>,
}

impl EnvSettings {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    /// Environment variable name for a settings key
    pub fn var_name(key: &str) -> String {
        key.split(':')
            .map(|part| part.replace(['-', '.'], "_").to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join("__")
    }
}

impl SettingsStore for EnvSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(&Self::var_name(key)).cloned()
    }
}
