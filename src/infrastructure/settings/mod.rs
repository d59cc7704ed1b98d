//! `SettingsStore` implementations

mod env;
mod layered;
mod memory;
mod toml_file;

pub use env::EnvSettings;
pub use layered::LayeredSettings;
pub use memory::MemorySettings;
pub use toml_file::TomlSettings;

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::backend_config::ConfigError;
use crate::application::ports::{SettingsSource, SettingsStore};

/// Environment variables layered over an optional TOML file
///
/// Every [`load`](SettingsSource::load) re-reads both, so edits apply to the
/// next request without a restart.
#[derive(Debug, Clone, Default)]
pub struct FileSettingsSource {
    settings_file: Option<PathBuf>,
}

impl FileSettingsSource {
    pub fn new(settings_file: Option<PathBuf>) -> Self {
        Self { settings_file }
    }
}

impl SettingsSource for FileSettingsSource {
    fn load(&self) -> Result<Arc<dyn SettingsStore>, ConfigError> {
        let mut layered = LayeredSettings::new().push(Arc::new(EnvSettings::from_env()));
        if let Some(path) = &self.settings_file {
            layered = layered.push(Arc::new(TomlSettings::from_file(path)?));
        }
        Ok(Arc::new(layered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_rereads_on_every_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://one\"\n").unwrap();

        let source = FileSettingsSource::new(Some(path.clone()));
        assert_eq!(
            source.load().unwrap().get("api:base_url").as_deref(),
            Some("http://one")
        );

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\nbase_url = \"http://two\"").unwrap();
        drop(file);

        assert_eq!(
            source.load().unwrap().get("api:base_url").as_deref(),
            Some("http://two")
        );
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let source = FileSettingsSource::new(Some(PathBuf::from("/nonexistent/settings.toml")));
        assert!(matches!(source.load(), Err(ConfigError::Source { .. })));
    }
}
