use axum::{
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Default upload ceiling (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Size limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimitConfig {
    /// Maximum request body size in bytes
    pub max_request_size: u64,
}

impl Default for SizeLimitConfig {
    fn default() -> Self {
        Self {
            max_request_size: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Serialize)]
struct SizeLimitErrorResponse {
    error: String,
    code: &'static str,
    max_allowed: String,
}

fn parse_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

/// 413 response shared by the middleware and the streaming check in the upload handler
pub fn size_limit_error(max_request_size: u64) -> Response {
    let body = SizeLimitErrorResponse {
        error: "Request body too large".to_string(),
        code: "SIZE_LIMIT_EXCEEDED",
        max_allowed: format!("{} bytes", max_request_size),
    };

    (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response()
}

/// Reject requests whose declared Content-Length is over the limit.
///
/// Chunked bodies carry no length; the upload handler counts those bytes as they arrive.
pub async fn enforce_size_limit(
    State(config): State<SizeLimitConfig>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(length) = parse_content_length(request.headers()) {
        if length > config.max_request_size {
            tracing::debug!(
                length,
                max = config.max_request_size,
                path = %request.uri().path(),
                "Rejected oversized request"
            );
            return size_limit_error(config.max_request_size);
        }
    }

    next.run(request).await
}
