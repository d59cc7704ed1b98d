use std::collections::HashMap;
use std::path::Path;
use toml::{Table, Value};

use crate::application::backend_config::ConfigError;
use crate::application::ports::SettingsStore;

/// Settings read from a TOML document
///
/// Nested tables flatten into colon-joined keys, so
///
/// ```toml
/// [storage.aws]
/// bucket = "remotes"
/// ```
///
/// is looked up as `storage:aws:bucket`. Quoted keys such as
/// `"storage:type" = "local"` work as well. Arrays are ignored.
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    values: HashMap<String, String>,
}

impl TomlSettings {
    pub fn parse(document: &str) -> Result<Self, ConfigError> {
        Self::parse_named(document, "<inline>")
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let document = std::fs::read_to_string(path).map_err(|e| ConfigError::Source {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        Self::parse_named(&document, &display)
    }

    fn parse_named(document: &str, origin: &str) -> Result<Self, ConfigError> {
        let table: Table = toml::from_str(document).map_err(|e| ConfigError::Source {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;

        let mut values = HashMap::new();
        flatten(None, &table, &mut values);
        Ok(Self { values })
    }
}

fn flatten(prefix: Option<&str>, table: &Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full_key = match prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.clone(),
        };

        match value {
            Value::Table(nested) => flatten(Some(&full_key), nested, out),
            Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            Value::Integer(i) => {
                out.insert(full_key, i.to_string());
            }
            Value::Float(f) => {
                out.insert(full_key, f.to_string());
            }
            Value::Boolean(b) => {
                out.insert(full_key, b.to_string());
            }
            Value::Datetime(d) => {
                out.insert(full_key, d.to_string());
            }
            Value::Array(_) => {}
        }
    }
}

impl SettingsStore for TomlSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
