//! # Supermemory Client
//!
//! HTTP implementation of `MemoryGateway` against the Supermemory REST API.
//! All calls are scoped to a container tag; per-call overrides fall back to
//! the tag the client was built with.

use super::validate::{
    sanitize_content, sanitize_metadata, validate_api_key_format, validate_container_tag,
    MAX_CONTENT_CHARS,
};
use super::{
    AddMemoryRequest, AddedMemory, DocumentPage, ForgetResult, MemoryGateway, Metadata,
    ProfileResult, SearchHit, SearchResult,
};
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.supermemory.ai";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Supermemory-backed memory gateway
pub struct SupermemoryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    container_tag: String,
    debug: bool,
}

// === Wire Types ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddBody<'a> {
    content: String,
    container_tag: &'a str,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct AddResponse {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    q: &'a str,
    container_tag: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WireSearchResult>,
}

#[derive(Deserialize)]
struct WireSearchResult {
    id: String,
    #[serde(default)]
    memory: Option<String>,
    #[serde(default)]
    similarity: Option<f64>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody<'a> {
    container_tag: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    #[serde(default)]
    profile: Option<WireProfile>,
    #[serde(default)]
    search_results: Option<WireProfileSearch>,
}

#[derive(Deserialize, Default)]
struct WireProfile {
    #[serde(default, rename = "static")]
    static_facts: Vec<String>,
    #[serde(default, rename = "dynamic")]
    dynamic_facts: Vec<String>,
}

#[derive(Deserialize, Default)]
struct WireProfileSearch {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForgetBody<'a> {
    container_tag: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListBody<'a> {
    container_tags: [&'a str; 1],
    limit: u32,
    page: u32,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    memories: Vec<WireDocument>,
    #[serde(default)]
    pagination: Option<WirePagination>,
}

#[derive(Deserialize)]
struct WireDocument {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePagination {
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Serialize)]
struct BulkDeleteBody<'a> {
    ids: &'a [String],
}

impl SupermemoryClient {
    /// Create a client for `container_tag`.
    ///
    /// Rejects malformed API keys; a questionable container tag is only
    /// logged since the backend is the final authority on tags.
    pub fn new(api_key: &str, container_tag: &str) -> Result<Self, GatewayError> {
        validate_api_key_format(api_key).map_err(GatewayError::InvalidApiKey)?;

        if let Err(reason) = validate_container_tag(container_tag) {
            tracing::warn!(container = %container_tag, "container tag warning: {}", reason);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("memoria/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        tracing::info!(container = %container_tag, "memory gateway initialized");

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            container_tag: container_tag.to_string(),
            debug: false,
        })
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Log request and response payloads at DEBUG level
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn resolve_tag<'a>(&'a self, container_tag: Option<&'a str>) -> &'a str {
        container_tag.unwrap_or(&self.container_tag)
    }

    fn debug_request<B: Serialize + ?Sized>(&self, operation: &str, body: &B) {
        if !self.debug {
            return;
        }
        let payload = serde_json::to_string_pretty(body).unwrap_or_default();
        tracing::debug!(operation, %payload, "→ request");
    }

    fn debug_response(&self, operation: &str, payload: &str) {
        if self.debug {
            tracing::debug!(operation, %payload, "← response");
        }
    }

    async fn send<B, R>(
        &self,
        method: Method,
        path: &str,
        operation: &'static str,
        body: &B,
    ) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let text = self.send_raw(method, path, operation, body).await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|source| GatewayError::Decode { operation, source })
    }

    async fn send_raw<B>(
        &self,
        method: Method,
        path: &str,
        operation: &'static str,
        body: &B,
    ) -> Result<String, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        self.debug_request(operation, body);

        let response = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                operation,
                status: status.as_u16(),
                body: text,
            });
        }

        self.debug_response(operation, &text);
        Ok(text)
    }
}

#[async_trait]
impl MemoryGateway for SupermemoryClient {
    fn container_tag(&self) -> &str {
        &self.container_tag
    }

    async fn add_memory(&self, request: AddMemoryRequest) -> Result<AddedMemory, GatewayError> {
        let body = AddBody {
            content: sanitize_content(&request.content, MAX_CONTENT_CHARS),
            container_tag: self.resolve_tag(request.container_tag.as_deref()),
            metadata: sanitize_metadata(&request.metadata),
            custom_id: request.custom_id.as_deref(),
        };

        let response: AddResponse = self
            .send(Method::POST, "/v3/documents", "add", &body)
            .await?;
        Ok(AddedMemory { id: response.id })
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        container_tag: Option<&str>,
    ) -> Result<Vec<SearchResult>, GatewayError> {
        let body = SearchBody {
            q: query,
            container_tag: self.resolve_tag(container_tag),
            limit,
        };

        let response: SearchResponse = self
            .send(Method::POST, "/v4/search", "search.memories", &body)
            .await?;

        let results: Vec<SearchResult> = response
            .results
            .into_iter()
            .map(|r| SearchResult {
                id: r.id,
                content: r.memory.unwrap_or_default(),
                similarity: r.similarity,
                metadata: r.metadata,
            })
            .collect();

        tracing::debug!(count = results.len(), "search complete");
        Ok(results)
    }

    async fn get_profile(
        &self,
        query: Option<&str>,
        container_tag: Option<&str>,
    ) -> Result<ProfileResult, GatewayError> {
        let body = ProfileBody {
            container_tag: self.resolve_tag(container_tag),
            q: query.filter(|q| !q.is_empty()),
        };

        let response: Option<ProfileResponse> = self
            .send(Method::POST, "/v4/profile", "profile", &body)
            .await?;
        let response = response.unwrap_or_default();
        let profile = response.profile.unwrap_or_default();

        let result = ProfileResult {
            static_facts: profile.static_facts,
            dynamic_facts: profile.dynamic_facts,
            search_hits: response.search_results.unwrap_or_default().results,
        };

        tracing::debug!(
            static_count = result.static_facts.len(),
            dynamic_count = result.dynamic_facts.len(),
            search_count = result.search_hits.len(),
            "profile fetched"
        );
        Ok(result)
    }

    async fn delete_memory(
        &self,
        id: &str,
        container_tag: Option<&str>,
    ) -> Result<ForgetResult, GatewayError> {
        let body = ForgetBody {
            container_tag: self.resolve_tag(container_tag),
            id,
        };
        self.send(Method::DELETE, "/v4/memories", "memories.delete", &body)
            .await
    }

    async fn list_documents(
        &self,
        container_tag: &str,
        page: u32,
        page_size: u32,
    ) -> Result<DocumentPage, GatewayError> {
        let body = ListBody {
            container_tags: [container_tag],
            limit: page_size,
            page,
        };

        let response: ListResponse = self
            .send(Method::POST, "/v3/documents/list", "documents.list", &body)
            .await?;

        Ok(DocumentPage {
            document_ids: response
                .memories
                .into_iter()
                .filter_map(|doc| doc.id.filter(|id| !id.is_empty()))
                .collect(),
            total_pages: response.pagination.and_then(|p| p.total_pages),
        })
    }

    async fn delete_bulk(&self, ids: &[String]) -> Result<(), GatewayError> {
        self.send_raw(
            Method::DELETE,
            "/v3/documents/bulk",
            "documents.deleteBulk",
            &BulkDeleteBody { ids },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "sm_test_key_0123456789";

    async fn client_for(server: &MockServer) -> SupermemoryClient {
        SupermemoryClient::new(KEY, "memoria_test")
            .unwrap()
            .with_base_url(server.uri())
    }

    #[test]
    fn test_rejects_malformed_api_key() {
        let err = SupermemoryClient::new("not-a-key", "memoria_test").err().unwrap();
        assert!(matches!(err, GatewayError::InvalidApiKey(_)));
    }

    #[tokio::test]
    async fn test_add_memory_sends_custom_id_and_default_tag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/documents"))
            .and(header("authorization", format!("Bearer {}", KEY).as_str()))
            .and(body_json(serde_json::json!({
                "content": "likes tea",
                "containerTag": "memoria_test",
                "metadata": {"type": "preference"},
                "customId": "session_abc"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "doc_1", "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let added = client
            .add_memory(
                AddMemoryRequest::new("  likes tea ")
                    .with_metadata("type", "preference")
                    .with_custom_id(Some("session_abc".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(added.id, "doc_1");
    }

    #[tokio::test]
    async fn test_search_maps_memory_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/search"))
            .and(body_json(serde_json::json!({
                "q": "tea",
                "containerTag": "other_tag",
                "limit": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": "m1", "memory": "likes tea", "similarity": 0.91},
                    {"id": "m2"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let results = client.search("tea", 5, Some("other_tag")).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "likes tea");
        assert_eq!(results[0].similarity, Some(0.91));
        assert_eq!(results[1].content, "");
    }

    #[tokio::test]
    async fn test_profile_tolerates_missing_sections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "profile": {"static": ["works at Acme"]},
                "searchResults": {"results": [{"memory": "likes tea", "updatedAt": "2025-01-01T00:00:00Z"}]}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let profile = client.get_profile(Some("drinks"), None).await.unwrap();
        assert_eq!(profile.static_facts, vec!["works at Acme".to_string()]);
        assert!(profile.dynamic_facts.is_empty());
        assert_eq!(profile.search_hits[0].text(), "likes tea");
    }

    #[tokio::test]
    async fn test_list_documents_reads_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/documents/list"))
            .and(body_json(serde_json::json!({
                "containerTags": ["memoria_test"],
                "limit": 100,
                "page": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "memories": [{"id": "d1"}, {"id": ""}, {"title": "no id"}, {"id": "d2"}],
                "pagination": {"currentPage": 2, "totalPages": 3}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page = client.list_documents("memoria_test", 2, 100).await.unwrap();
        assert_eq!(page.document_ids, vec!["d1".to_string(), "d2".to_string()]);
        assert_eq!(page.total_pages, Some(3));
    }

    #[tokio::test]
    async fn test_delete_bulk_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v3/documents/bulk"))
            .and(body_json(serde_json::json!({"ids": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .delete_bulk(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v4/memories"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.delete_memory("m1", None).await.unwrap_err();
        match err {
            GatewayError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
