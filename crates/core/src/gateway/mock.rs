//! # Recording Gateway
//!
//! In-memory `MemoryGateway` that serves canned responses and records every
//! call, for tests of the code that sits on top of the gateway.

use super::{
    AddMemoryRequest, AddedMemory, DocumentPage, ForgetResult, MemoryGateway, ProfileResult,
    SearchResult,
};
use crate::error::GatewayError;
use async_trait::async_trait;
use std::sync::Mutex;

/// A call observed by the recording gateway
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Add(AddMemoryRequest),
    Search {
        query: String,
        limit: usize,
        container_tag: Option<String>,
    },
    Profile {
        query: Option<String>,
        container_tag: Option<String>,
    },
    Delete {
        id: String,
        container_tag: Option<String>,
    },
    List {
        container_tag: String,
        page: u32,
        page_size: u32,
    },
    DeleteBulk(Vec<String>),
}

/// Canned-response gateway
#[derive(Default)]
pub struct RecordingGateway {
    container_tag: String,
    profile: ProfileResult,
    search_results: Vec<SearchResult>,
    documents: Vec<String>,
    total_pages: Option<Option<u32>>,
    fail_add: bool,
    fail_profile: bool,
    fail_search: bool,
    fail_list_page: Option<u32>,
    fail_bulk_batch: Option<usize>,
    calls: Mutex<Vec<GatewayCall>>,
}

fn rejected(operation: &'static str) -> GatewayError {
    GatewayError::Rejected {
        operation,
        message: "backend unavailable".to_string(),
    }
}

impl RecordingGateway {
    pub fn new(container_tag: &str) -> Self {
        Self {
            container_tag: container_tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_profile(mut self, profile: ProfileResult) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = results;
        self
    }

    /// Documents served by `list_documents`, paged by the requested page size
    pub fn with_documents(mut self, ids: Vec<String>) -> Self {
        self.documents = ids;
        self
    }

    /// Override the total page count reported by `list_documents`
    pub fn with_total_pages(mut self, total_pages: Option<u32>) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    pub fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub fn failing_profile(mut self) -> Self {
        self.fail_profile = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Fail the listing of `page` (1-based)
    pub fn failing_list_page(mut self, page: u32) -> Self {
        self.fail_list_page = Some(page);
        self
    }

    /// Fail the `batch_index`-th (0-based) bulk delete
    pub fn failing_bulk_batch(mut self, batch_index: usize) -> Self {
        self.fail_bulk_batch = Some(batch_index);
        self
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    /// Every call in the order it was made
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Requests passed to `add_memory`
    pub fn added(&self) -> Vec<AddMemoryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Add(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Id batches passed to `delete_bulk`
    pub fn bulk_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::DeleteBulk(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MemoryGateway for RecordingGateway {
    fn container_tag(&self) -> &str {
        &self.container_tag
    }

    async fn add_memory(&self, request: AddMemoryRequest) -> Result<AddedMemory, GatewayError> {
        self.record(GatewayCall::Add(request));
        if self.fail_add {
            return Err(rejected("add"));
        }
        Ok(AddedMemory {
            id: format!("mem_{}", self.added().len()),
        })
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        container_tag: Option<&str>,
    ) -> Result<Vec<SearchResult>, GatewayError> {
        self.record(GatewayCall::Search {
            query: query.to_string(),
            limit,
            container_tag: container_tag.map(str::to_string),
        });
        if self.fail_search {
            return Err(rejected("search"));
        }
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }

    async fn get_profile(
        &self,
        query: Option<&str>,
        container_tag: Option<&str>,
    ) -> Result<ProfileResult, GatewayError> {
        self.record(GatewayCall::Profile {
            query: query.map(str::to_string),
            container_tag: container_tag.map(str::to_string),
        });
        if self.fail_profile {
            return Err(rejected("profile"));
        }
        Ok(self.profile.clone())
    }

    async fn delete_memory(
        &self,
        id: &str,
        container_tag: Option<&str>,
    ) -> Result<ForgetResult, GatewayError> {
        self.record(GatewayCall::Delete {
            id: id.to_string(),
            container_tag: container_tag.map(str::to_string),
        });
        Ok(ForgetResult {
            id: id.to_string(),
            forgotten: true,
        })
    }

    async fn list_documents(
        &self,
        container_tag: &str,
        page: u32,
        page_size: u32,
    ) -> Result<DocumentPage, GatewayError> {
        self.record(GatewayCall::List {
            container_tag: container_tag.to_string(),
            page,
            page_size,
        });
        if self.fail_list_page == Some(page) {
            return Err(rejected("list_documents"));
        }

        let size = page_size.max(1) as usize;
        let start = (page.saturating_sub(1) as usize) * size;
        let document_ids = self.documents.iter().skip(start).take(size).cloned().collect();
        let computed = self.documents.len().div_ceil(size) as u32;

        Ok(DocumentPage {
            document_ids,
            total_pages: self.total_pages.unwrap_or(Some(computed)),
        })
    }

    async fn delete_bulk(&self, ids: &[String]) -> Result<(), GatewayError> {
        let batch_index = self.bulk_batches().len();
        self.record(GatewayCall::DeleteBulk(ids.to_vec()));
        if self.fail_bulk_batch == Some(batch_index) {
            return Err(rejected("delete_bulk"));
        }
        Ok(())
    }
}
