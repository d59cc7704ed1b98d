use async_trait::async_trait;
#[cfg(test)]
use mockall::{automock, predicate::*};

use crate::application::ports::StorageError;

/// Port for blob-service container management
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContainerAdmin: Send + Sync {
    /// Create `container` unless it already exists
    async fn ensure_container(&self, container: &str) -> Result<(), StorageError>;
}
