use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::errors::ApiError;
use crate::api::middleware::size_limit_error;
use crate::api::router::UploadState;
use crate::application::storage_service::StorageService;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/remotes/{name}/{version}/upload
/// Body is the raw zip archive
pub async fn upload_handler(
    State(state): State<Arc<UploadState>>,
    Path((name, version)): Path<(String, String)>,
    body: Body,
) -> Result<Response, ApiError> {
    // Settings are re-read for every request
    let settings = state.settings.load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load settings");
        ApiError::from(e)
    })?;
    let service = StorageService::new(Arc::clone(&state.factory), settings);

    // Count streamed bytes so chunked bodies without Content-Length are capped as well
    let limit = state.limits.max_request_size;
    let exceeded = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&exceeded);
    let mut received: u64 = 0;

    let stream = body.into_data_stream().map(move |result| -> std::io::Result<Bytes> {
        let chunk = result.map_err(std::io::Error::other)?;
        received += chunk.len() as u64;
        if received > limit {
            flag.store(true, Ordering::Relaxed);
            return Err(std::io::Error::other("upload exceeds size limit"));
        }
        Ok(chunk)
    });
    let reader = Box::pin(tokio_util::io::StreamReader::new(stream));

    match service.upload(&name, &version, reader).await {
        Ok(location) => Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: location.into_string(),
            }),
        )
            .into_response()),
        Err(_) if exceeded.load(Ordering::Relaxed) => Ok(size_limit_error(limit)),
        Err(e) => Err(e.into()),
    }
}
