use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::backend_config::ConfigError;
use crate::application::ports::StorageError;
use crate::application::storage_service::ServiceError;

/// API error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
        }));

        (self.status, body).into_response()
    }
}

// Configuration and backend details stay in the logs; clients get a fixed message

impl From<ConfigError> for ApiError {
    fn from(_: ConfigError) -> Self {
        ApiError::internal_error("Storage is not configured correctly")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Config(e) => e.into(),
            ServiceError::Upload { source, .. } => match source {
                StorageError::BackendFailure { .. } => {
                    ApiError::bad_gateway("Storage backend failure")
                }
                client_error => ApiError::bad_request(client_error.to_string()),
            },
        }
    }
}
