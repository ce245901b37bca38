//! # Slash Commands
//!
//! `/remember` and `/recall`. Commands always answer with text; backend
//! failures become a short apology and a log line.

use super::search::render_results;
use super::ToolOutput;
use crate::gateway::validate::limit_text;
use crate::gateway::{AddMemoryRequest, MemoryGateway};
use crate::memory::category::classify;
use crate::memory::identity::document_id_for;

/// Source tag recorded on command writes
pub const COMMAND_SOURCE: &str = "memoria_command";

const REMEMBER_PREVIEW_CHARS: usize = 60;
const RECALL_LIMIT: usize = 5;

/// `/remember <text>`
pub async fn remember<G>(gateway: &G, session_key: Option<&str>, args: &str) -> ToolOutput
where
    G: MemoryGateway + ?Sized,
{
    let text = args.trim();
    if text.is_empty() {
        return ToolOutput::text("Usage: /remember <text to remember>");
    }

    tracing::debug!(text = %limit_text(text, 50), "/remember");

    let category = classify(text);
    let request = AddMemoryRequest::new(text)
        .with_metadata("type", category.as_str())
        .with_metadata("source", COMMAND_SOURCE)
        .with_custom_id(document_id_for(session_key));

    match gateway.add_memory(request).await {
        Ok(_) => ToolOutput::text(format!(
            "Remembered: \"{}\"",
            limit_text(text, REMEMBER_PREVIEW_CHARS)
        )),
        Err(e) => {
            tracing::error!("/remember failed: {}", e);
            ToolOutput::text("Failed to save memory. Check logs for details.")
        }
    }
}

/// `/recall <query>`
pub async fn recall<G>(gateway: &G, args: &str) -> ToolOutput
where
    G: MemoryGateway + ?Sized,
{
    let query = args.trim();
    if query.is_empty() {
        return ToolOutput::text("Usage: /recall <search query>");
    }

    tracing::debug!(query = %query, "/recall");

    match gateway.search(query, RECALL_LIMIT, None).await {
        Ok(results) if results.is_empty() => {
            ToolOutput::text(format!("No memories found for: \"{}\"", query))
        }
        Ok(results) => ToolOutput::text(format!(
            "Found {} memories:\n\n{}",
            results.len(),
            render_results(&results)
        )),
        Err(e) => {
            tracing::error!("/recall failed: {}", e);
            ToolOutput::text("Failed to search memories. Check logs for details.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MetadataValue, RecordingGateway, SearchResult};

    #[tokio::test]
    async fn test_remember() {
        let gateway = RecordingGateway::new("tag");

        let usage = remember(&gateway, None, "   ").await;
        assert_eq!(usage.text, "Usage: /remember <text to remember>");

        let output = remember(&gateway, Some("s1"), "  we decided to use Postgres ").await;
        assert_eq!(output.text, "Remembered: \"we decided to use Postgres\"");

        let added = gateway.added();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].content, "we decided to use Postgres");
        assert_eq!(
            added[0].metadata.get("type"),
            Some(&MetadataValue::Text("decision".to_string()))
        );
        assert_eq!(
            added[0].metadata.get("source"),
            Some(&MetadataValue::Text(COMMAND_SOURCE.to_string()))
        );
        assert_eq!(added[0].custom_id.as_deref(), Some("session_s1"));
    }

    #[tokio::test]
    async fn test_remember_failure_message() {
        let gateway = RecordingGateway::new("tag").failing_add();
        let output = remember(&gateway, None, "something").await;
        assert_eq!(output.text, "Failed to save memory. Check logs for details.");
    }

    #[tokio::test]
    async fn test_recall() {
        let gateway = RecordingGateway::new("tag").with_search_results(vec![SearchResult {
            id: "m1".to_string(),
            content: "has a cat named Miso".to_string(),
            similarity: Some(0.88),
            metadata: None,
        }]);

        assert_eq!(
            recall(&gateway, "").await.text,
            "Usage: /recall <search query>"
        );
        assert_eq!(
            recall(&gateway, "pets").await.text,
            "Found 1 memories:\n\n1. has a cat named Miso (88%)"
        );
    }

    #[tokio::test]
    async fn test_recall_empty_and_failure() {
        let empty = RecordingGateway::new("tag");
        assert_eq!(
            recall(&empty, "pets").await.text,
            "No memories found for: \"pets\""
        );

        let failing = RecordingGateway::new("tag").failing_search();
        assert_eq!(
            recall(&failing, "pets").await.text,
            "Failed to search memories. Check logs for details."
        );
    }
}
