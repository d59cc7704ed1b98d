use std::path::{Component, Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::application::backend_config::LocalStorageConfig;
use crate::domain::value_objects::ArtifactCoordinates;

/// Folder under the content root used when `storage:path` is absent or unusable
pub const DEFAULT_STORAGE_DIR: &str = "remotes";

/// Utility for generating local artifact paths
#[derive(Debug, Clone)]
pub struct PathBuilder {
    base_dir: PathBuf,
}

impl PathBuilder {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve the base directory from local storage settings
    pub fn from_config(config: &LocalStorageConfig) -> Self {
        Self::new(resolve_base_dir(
            &config.content_root,
            config.storage_path.as_deref(),
        ))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding every version of a remote: /base/{name}
    pub fn name_dir(&self, coordinates: &ArtifactCoordinates) -> PathBuf {
        self.base_dir.join(coordinates.name().as_str())
    }

    /// Published version directory: /base/{name}/{version}
    pub fn version_dir(&self, coordinates: &ArtifactCoordinates) -> PathBuf {
        self.name_dir(coordinates)
            .join(coordinates.version().as_str())
    }

    /// Scratch area for staged and retired trees, a hidden sibling of the base
    /// directory so the static route never serves it: /.{base}.scratch
    pub fn scratch_dir(&self) -> PathBuf {
        match (self.base_dir.parent(), self.base_dir.file_name()) {
            (Some(parent), Some(base_name)) => {
                parent.join(format!(".{}.scratch", base_name.to_string_lossy()))
            }
            _ => self.base_dir.join(".scratch"),
        }
    }

    /// Staging directory for an in-flight upload: /.{base}.scratch/{name}-{version}.staging-{uuid}
    pub fn staging_dir(&self, coordinates: &ArtifactCoordinates, id: Uuid) -> PathBuf {
        self.scratch_entry(coordinates, "staging", id)
    }

    /// Where a replaced version waits for deletion: /.{base}.scratch/{name}-{version}.retired-{uuid}
    pub fn retired_dir(&self, coordinates: &ArtifactCoordinates, id: Uuid) -> PathBuf {
        self.scratch_entry(coordinates, "retired", id)
    }

    fn scratch_entry(&self, coordinates: &ArtifactCoordinates, state: &str, id: Uuid) -> PathBuf {
        self.scratch_dir().join(format!(
            "{}-{}.{}-{}",
            coordinates.name().as_str(),
            coordinates.version().as_str(),
            state,
            id
        ))
    }

    /// Join an ingested `/`-separated relative path onto `dir`
    pub fn entry_path(dir: &Path, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .fold(dir.to_path_buf(), |path, segment| path.join(segment))
    }
}

/// Resolve `storage:path` against the content root.
///
/// Relative values are joined onto the content root. Anything that ends up
/// outside the content root falls back to the default folder with a warning
/// instead of failing.
pub fn resolve_base_dir(content_root: &Path, configured: Option<&str>) -> PathBuf {
    let content_root = normalize(content_root);
    let default_dir = content_root.join(DEFAULT_STORAGE_DIR);

    let Some(configured) = configured.map(str::trim).filter(|value| !value.is_empty()) else {
        return default_dir;
    };

    let resolved = normalize(&content_root.join(configured));
    if resolved.starts_with(&content_root) {
        resolved
    } else {
        warn!(
            configured,
            fallback = %default_dir.display(),
            "storage:path resolves outside the content root, using the default folder"
        );
        default_dir
    }
}

/// Lexical normalization: drops `.` and folds `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
