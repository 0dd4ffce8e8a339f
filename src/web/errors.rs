//! # Admin API Error Types
//!
//! Error types for the admin surface and their HTTP response conversions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::MonitorError;

/// Admin API errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,

    #[error("State store unavailable: {operation}")]
    StoreUnavailable { operation: String },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn store_unavailable(operation: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found"),

            ApiError::StoreUnavailable { operation } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                operation.as_str(),
            ),

            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message
            }
        });

        (status_code, Json(error_response)).into_response()
    }
}

/// Only store failures reach the admin surface; everything else is internal
impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Store(e) => ApiError::store_unavailable(e.to_string()),
            _ => ApiError::Internal,
        }
    }
}

/// Result type alias for admin API operations
pub type ApiResult<T> = Result<T, ApiError>;
