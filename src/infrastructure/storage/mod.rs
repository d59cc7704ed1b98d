mod azure_connection;
mod azure_container_admin;
mod blob_store_provider;
mod cloud_connector;
mod filesystem_provider;
mod object_store_provider;
mod object_writer;
mod path_builder;

pub use azure_connection::AzureConnectionString;
pub use azure_container_admin::SharedKeyContainerAdmin;
pub use blob_store_provider::BlobStoreProvider;
pub use cloud_connector::CloudConnector;
pub use filesystem_provider::{FilesystemProvider, REMOTES_ROUTE};
pub use object_store_provider::ObjectStoreProvider;
pub use object_writer::content_type_for;
pub use path_builder::{resolve_base_dir, PathBuilder, DEFAULT_STORAGE_DIR};
