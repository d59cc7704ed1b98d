use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ArtifactName, ArtifactVersion};

/// A validated (name, version) pair addressing one stored artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinates {
    name: ArtifactName,
    version: ArtifactVersion,
}

impl ArtifactCoordinates {
    pub fn new(name: ArtifactName, version: ArtifactVersion) -> Self {
        Self { name, version }
    }

    /// Validate raw strings. The name is checked first.
    pub fn parse(name: &str, version: &str) -> Result<Self, DomainError> {
        let name = ArtifactName::new(name.to_string())?;
        let version = ArtifactVersion::new(version.to_string())?;
        Ok(Self::new(name, version))
    }

    pub fn name(&self) -> &ArtifactName {
        &self.name
    }

    pub fn version(&self) -> &ArtifactVersion {
        &self.version
    }

    /// Key prefix shared by every object of this artifact: `{name}/{version}`
    pub fn prefix(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Object key for an ingested entry: `{name}/{version}/{relative_path}`
    pub fn object_key(&self, relative_path: &str) -> String {
        format!("{}/{}", self.prefix(), relative_path)
    }
}

impl std::fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
