//! # Forget Tool
//!
//! Deletes a memory directly by id, or finds the closest match to a
//! description and deletes that.

use super::ToolOutput;
use crate::error::GatewayError;
use crate::gateway::validate::limit_text;
use crate::gateway::MemoryGateway;
use serde::{Deserialize, Serialize};

/// How many candidates a forget-by-query search considers
pub const FORGET_CANDIDATES: usize = 5;

const PREVIEW_CHARS: usize = 100;

/// Arguments for the forget tool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgetArgs {
    /// Describe the memory to forget
    #[serde(default)]
    pub query: Option<String>,
    /// Direct memory id to delete
    #[serde(default)]
    pub memory_id: Option<String>,
}

/// Result of a forget-by-query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForgetOutcome {
    pub success: bool,
    pub message: String,
}

impl ForgetOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Search for `query` and delete the best match
pub async fn forget_by_query<G>(
    gateway: &G,
    query: &str,
    container_tag: Option<&str>,
) -> Result<ForgetOutcome, GatewayError>
where
    G: MemoryGateway + ?Sized,
{
    let results = gateway.search(query, FORGET_CANDIDATES, container_tag).await?;
    let Some(target) = results.first() else {
        return Ok(ForgetOutcome::failed("No matching memory found to forget."));
    };

    gateway.delete_memory(&target.id, container_tag).await?;

    Ok(ForgetOutcome {
        success: true,
        message: format!("Forgot: \"{}\"", limit_text(&target.content, PREVIEW_CHARS)),
    })
}

pub async fn forget<G>(gateway: &G, args: ForgetArgs) -> Result<ToolOutput, GatewayError>
where
    G: MemoryGateway + ?Sized,
{
    if let Some(id) = args.memory_id.filter(|id| !id.is_empty()) {
        tracing::debug!(id = %id, "forget tool: direct delete");
        gateway.delete_memory(&id, None).await?;
        return Ok(ToolOutput::text("Memory forgotten."));
    }

    if let Some(query) = args.query.filter(|q| !q.is_empty()) {
        tracing::debug!(query = %query, "forget tool: search then delete");
        let outcome = forget_by_query(gateway, &query, None).await?;
        return Ok(ToolOutput::text(outcome.message));
    }

    Ok(ToolOutput::text("Provide a query or memoryId to forget."))
}
