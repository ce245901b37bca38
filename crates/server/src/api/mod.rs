//! # HTTP API
//!
//! Route groups mounted under `/api/v1`.

pub mod hooks;
pub mod memory;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use memoria_core::{GatewayError, WipeError};
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned by memory routes while no API key is configured
pub const NOT_CONFIGURED: &str =
    "memoria is not configured: set MEMORIA_API_KEY or apiKey in .memoria/config.json";

/// Error body for every failing route
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Documents removed before a wipe failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_so_far: Option<usize>,
}

/// Route-level error with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                deleted_so_far: None,
            },
        }
    }

    pub fn not_configured() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, NOT_CONFIGURED)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        tracing::error!("memory backend error: {}", err);
        Self::new(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

impl From<WipeError> for ApiError {
    fn from(err: WipeError) -> Self {
        tracing::error!("wipe failed: {}", err);
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorResponse {
                error: err.to_string(),
                deleted_so_far: Some(err.deleted_so_far()),
            },
        }
    }
}
