use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use remote_storage::{
    api::{create_router, middleware::SizeLimitConfig, router::AppState},
    application::factory::ProviderFactory,
    infrastructure::{settings::FileSettingsSource, storage::CloudConnector},
    Config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with structured logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }

    info!("Starting remote storage service");

    // Load configuration
    let config = Config::from_env();
    config.validate()?;
    info!(
        content_root = %config.content_root.display(),
        settings_file = ?config.settings_file,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded and validated"
    );

    let factory = Arc::new(ProviderFactory::new(
        Arc::new(CloudConnector),
        config.content_root.clone(),
    ));
    let settings = Arc::new(FileSettingsSource::new(config.settings_file.clone()));

    let state = AppState {
        factory,
        settings,
        limits: SizeLimitConfig {
            max_request_size: config.max_upload_bytes,
        },
    };

    let app = create_router(state);

    info!("Listening on {}", config.listen_addr);
    let listener = TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
