mod artifact_coordinates;
mod artifact_location;
mod artifact_name;
mod artifact_version;
mod backend_kind;

pub use artifact_coordinates::ArtifactCoordinates;
pub use artifact_location::{ArtifactLocation, REMOTE_ENTRY_FILE};
pub use artifact_name::ArtifactName;
pub use artifact_version::ArtifactVersion;
pub use backend_kind::BackendKind;
