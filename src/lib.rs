//! # remote_storage - Module Federation Remote Storage
//!
//! Accepts zipped front-end bundles ("remotes") and publishes them under
//! `{name}/{version}/` on a local directory, an S3 bucket or an Azure Blob
//! container, returning the public URL of the bundle's `remoteEntry.js`.
//!
//! ## Architecture Layers
//!
//! - **Domain**: Name validation and value objects
//! - **Application**: Ports, archive ingestion, backend configuration, the provider factory and the storage service
//! - **Infrastructure**: Filesystem, S3 and Azure providers; settings stores
//! - **API**: Upload, static serving and health routes
//!
//! ## Example Usage
//!
//! ```no_run
//! use remote_storage::application::{factory::ProviderFactory, storage_service::StorageService};
//! use remote_storage::infrastructure::{settings::MemorySettings, storage::CloudConnector};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = Arc::new(ProviderFactory::new(Arc::new(CloudConnector), "/srv/app".into()));
//! let settings = MemorySettings::from_pairs([
//!     ("storage:type", "local"),
//!     ("api:base_url", "https://cdn.example.com"),
//! ]);
//! let service = StorageService::new(factory, Arc::new(settings));
//!
//! let archive = tokio::fs::File::open("bundle.zip").await?;
//! let url = service.upload("checkout", "1.4.0", Box::pin(archive)).await?;
//! println!("{}", url);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use api::errors as api_errors;
pub use application::{archive, ports, storage_service};
pub use config::Config;
pub use domain::errors as domain_errors;
pub use domain::value_objects;
