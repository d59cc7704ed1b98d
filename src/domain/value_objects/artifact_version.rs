use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::validation::NameValidator;

/// Validated remote version. Any safe path component is accepted, semver is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactVersion(String);

impl ArtifactVersion {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if !NameValidator::validate(&value) {
            return Err(DomainError::InvalidArtifactVersion(value));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArtifactVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}
