use serde::Serialize;

use crate::domain::value_objects::ArtifactCoordinates;

/// Entry-point file every stored remote exposes. Hosts load this exact name.
pub const REMOTE_ENTRY_FILE: &str = "remoteEntry.js";

/// Publicly resolvable address of a stored remote's entry point:
/// `{base}/{name}/{version}/remoteEntry.js`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactLocation(String);

impl ArtifactLocation {
    /// Build the location under `base`, which must already include any
    /// backend-specific prefix (`/remotes`, bucket or container).
    pub fn under(base: &str, coordinates: &ArtifactCoordinates) -> Self {
        Self(format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            coordinates.prefix(),
            REMOTE_ENTRY_FILE
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
