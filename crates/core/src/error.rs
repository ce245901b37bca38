//! # Errors
//!
//! Error types for the gateway seam, bulk wipes and configuration.

use thiserror::Error;

/// Failure talking to the memory backend
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("request to memory backend failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("{operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Backend answered 2xx but the payload did not match the expected shape
    #[error("{operation} returned an unexpected payload: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// API key failed the local format check
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    /// Non-HTTP gateways report failures through this variant
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

/// Failure of a container wipe.
///
/// A wipe is not resumable. `BatchFailed` reports how many documents were
/// already gone when the failing batch was issued.
#[derive(Debug, Error)]
pub enum WipeError {
    #[error("listing page {page} failed: {source}")]
    Listing {
        page: u32,
        #[source]
        source: GatewayError,
    },

    #[error("delete batch {batch_index} failed after {deleted_so_far} documents were deleted: {source}")]
    BatchFailed {
        batch_index: usize,
        deleted_so_far: usize,
        #[source]
        source: GatewayError,
    },
}

impl WipeError {
    /// Number of documents deleted before the failure
    pub fn deleted_so_far(&self) -> usize {
        match self {
            WipeError::Listing { .. } => 0,
            WipeError::BatchFailed { deleted_so_far, .. } => *deleted_so_far,
        }
    }
}

/// Invalid plugin configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("memoria config has unknown keys: {0}")]
    UnknownKeys(String),

    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("invalid memoria config: {0}")]
    Invalid(#[from] serde_json::Error),
}
