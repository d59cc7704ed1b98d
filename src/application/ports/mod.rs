mod container_admin;
mod settings_store;
mod storage_provider;

pub use container_admin::ContainerAdmin;
pub use settings_store::{SettingsSource, SettingsStore};
pub use storage_provider::{BlobReader, BoxError, StorageError, StorageProvider};

#[cfg(test)]
pub use container_admin::MockContainerAdmin;
#[cfg(test)]
pub use settings_store::MockSettingsStore;
#[cfg(test)]
pub use storage_provider::MockStorageProvider;
