//! # Search Tool
//!
//! Direct similarity search, bypassing the profile.

use super::{score_suffix, ToolOutput};
use crate::error::GatewayError;
use crate::gateway::{MemoryGateway, SearchResult};
use serde::Deserialize;
use serde_json::json;

/// Default number of results
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Arguments for the search tool
#[derive(Debug, Clone, Deserialize)]
pub struct SearchArgs {
    /// Search query
    pub query: String,
    /// Maximum number of results (default: 5)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Numbered result lines, e.g. `1. likes tea (91%)`
pub fn render_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}{}", i + 1, r.content, score_suffix(r.similarity)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn search<G>(gateway: &G, args: SearchArgs) -> Result<ToolOutput, GatewayError>
where
    G: MemoryGateway + ?Sized,
{
    let query = args.query.trim();
    if query.is_empty() {
        return Ok(ToolOutput::text("Provide a search query."));
    }

    let limit = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    tracing::debug!(query = %query, limit, "search tool");

    let results = gateway.search(query, limit, None).await?;

    if results.is_empty() {
        return Ok(ToolOutput::text("No relevant memories found."));
    }

    let memories: Vec<_> = results
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "content": r.content,
                "similarity": r.similarity,
            })
        })
        .collect();

    Ok(ToolOutput::text(format!(
        "Found {} memories:\n\n{}",
        results.len(),
        render_results(&results)
    ))
    .with_details(json!({
        "count": results.len(),
        "memories": memories,
    })))
}
