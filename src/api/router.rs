use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::handlers::{health_handler, upload_handler};
use crate::api::middleware::{enforce_size_limit, SizeLimitConfig};
use crate::application::backend_config::keys;
use crate::application::factory::ProviderFactory;
use crate::application::ports::SettingsSource;
use crate::infrastructure::storage::{resolve_base_dir, REMOTES_ROUTE};

/// Application state container
#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<ProviderFactory>,
    pub settings: Arc<dyn SettingsSource>,
    pub limits: SizeLimitConfig,
}

/// State handed to the upload route
pub struct UploadState {
    pub factory: Arc<ProviderFactory>,
    pub settings: Arc<dyn SettingsSource>,
    pub limits: SizeLimitConfig,
}

impl AppState {
    /// Directory served under `/remotes`, resolved from the settings at startup
    pub fn remotes_dir(&self) -> PathBuf {
        let configured = match self.settings.load() {
            Ok(settings) => settings.get(keys::STORAGE_PATH),
            Err(e) => {
                warn!(error = %e, "Settings unavailable while resolving the remotes directory");
                None
            }
        };
        resolve_base_dir(self.factory.content_root(), configured.as_deref())
    }
}

/// Create router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let remotes_dir = state.remotes_dir();
    info!(dir = %remotes_dir.display(), "Serving local remotes");

    let upload_state = Arc::new(UploadState {
        factory: Arc::clone(&state.factory),
        settings: Arc::clone(&state.settings),
        limits: state.limits,
    });

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/remotes/{name}/{version}/upload",
            post(upload_handler).with_state(upload_state),
        )
        .nest_service(REMOTES_ROUTE, ServeDir::new(remotes_dir))
        .layer(axum_middleware::from_fn_with_state(
            state.limits,
            enforce_size_limit,
        ))
        .layer(TraceLayer::new_for_http())
}
