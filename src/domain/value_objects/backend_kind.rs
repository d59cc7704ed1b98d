use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Storage backend selected by `storage:type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Directory tree on the local filesystem
    #[default]
    Local,
    /// Azure Blob Storage container
    Azure,
    /// S3 bucket
    Aws,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Azure => write!(f, "azure"),
            BackendKind::Aws => write!(f, "aws"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "azure" => Ok(BackendKind::Azure),
            "aws" => Ok(BackendKind::Aws),
            _ => Err(DomainError::InvalidBackendKind(s.to_string())),
        }
    }
}
