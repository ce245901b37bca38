//! # Memory Gateway
//!
//! The only seam that talks to the remote memory service. Everything else in
//! the crate consumes these types and the `MemoryGateway` trait.
//!
//! ## Architecture
//!
//! ```text
//! session hooks / tools / lifecycle
//!                ↓
//!         MemoryGateway (trait)
//!                ↓
//!   SupermemoryClient (HTTP)  or  RecordingGateway (tests)
//! ```

pub mod client;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod validate;

pub use client::SupermemoryClient;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{GatewayCall, RecordingGateway};

use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar metadata value attached to a stored memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Number(value.into())
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// Options for storing a memory.
///
/// Unset optional fields fall back to the gateway's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddMemoryRequest {
    pub content: String,
    pub metadata: Metadata,
    pub custom_id: Option<String>,
    pub container_tag: Option<String>,
}

impl AddMemoryRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_custom_id(mut self, custom_id: Option<String>) -> Self {
        self.custom_id = custom_id;
        self
    }

    pub fn with_container_tag(mut self, tag: Option<String>) -> Self {
        self.container_tag = tag;
        self
    }
}

/// Identity of a freshly stored memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddedMemory {
    pub id: String,
}

/// A memory returned by a direct similarity search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A similarity hit returned alongside a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
}

impl SearchHit {
    /// Memory text, empty when the backend sent none
    pub fn text(&self) -> &str {
        self.memory.as_deref().unwrap_or("")
    }
}

/// Profile summary for a container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileResult {
    /// Stable, long-lived facts
    pub static_facts: Vec<String>,
    /// Recent, short-lived facts
    pub dynamic_facts: Vec<String>,
    /// Query-relevant hits (empty when no query was given)
    pub search_hits: Vec<SearchHit>,
}

/// Outcome of deleting a single memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForgetResult {
    pub id: String,
    pub forgotten: bool,
}

/// One page of the document listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPage {
    pub document_ids: Vec<String>,
    /// Total pages reported by the backend, if any
    pub total_pages: Option<u32>,
}

/// Operations the core needs from the memory backend
#[async_trait]
pub trait MemoryGateway: Send + Sync {
    /// Default container tag for calls that do not override it
    fn container_tag(&self) -> &str;

    async fn add_memory(&self, request: AddMemoryRequest) -> Result<AddedMemory, GatewayError>;

    async fn search(
        &self,
        query: &str,
        limit: usize,
        container_tag: Option<&str>,
    ) -> Result<Vec<SearchResult>, GatewayError>;

    async fn get_profile(
        &self,
        query: Option<&str>,
        container_tag: Option<&str>,
    ) -> Result<ProfileResult, GatewayError>;

    async fn delete_memory(
        &self,
        id: &str,
        container_tag: Option<&str>,
    ) -> Result<ForgetResult, GatewayError>;

    async fn list_documents(
        &self,
        container_tag: &str,
        page: u32,
        page_size: u32,
    ) -> Result<DocumentPage, GatewayError>;

    async fn delete_bulk(&self, ids: &[String]) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_builder() {
        let request = AddMemoryRequest::new("likes tea")
            .with_metadata("type", "preference")
            .with_metadata("pinned", true)
            .with_custom_id(Some("session_a".to_string()));

        assert_eq!(request.content, "likes tea");
        assert_eq!(request.metadata.len(), 2);
        assert_eq!(request.custom_id.as_deref(), Some("session_a"));
        assert_eq!(request.container_tag, None);
    }

    #[test]
    fn test_metadata_serializes_as_scalars() {
        let mut metadata = Metadata::new();
        metadata.insert("count".to_string(), 3i64.into());
        metadata.insert("source".to_string(), "memoria".into());
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"count":3,"source":"memoria"}"#);
    }

    #[test]
    fn test_search_hit_from_backend_json() {
        let hit: SearchHit = serde_json::from_value(serde_json::json!({
            "memory": "likes tea",
            "updatedAt": "2025-01-01T00:00:00Z",
            "similarity": 0.8,
            "id": "ignored"
        }))
        .unwrap();
        assert_eq!(hit.text(), "likes tea");
        assert_eq!(hit.updated_at.as_deref(), Some("2025-01-01T00:00:00Z"));

        let empty: SearchHit = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.text(), "");
    }
}
