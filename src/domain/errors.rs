use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid artifact name: {0:?}")]
    InvalidArtifactName(String),

    #[error("Invalid artifact version: {0:?}")]
    InvalidArtifactVersion(String),

    #[error("Invalid storage backend kind: {0:?}")]
    InvalidBackendKind(String),
}
