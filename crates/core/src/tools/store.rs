//! # Store Tool

use super::ToolOutput;
use crate::error::GatewayError;
use crate::gateway::validate::limit_text;
use crate::gateway::{AddMemoryRequest, MemoryGateway};
use crate::memory::category::{classify, MemoryCategory};
use crate::memory::identity::document_id_for;
use serde::Deserialize;

/// Source tag recorded on tool writes
pub const TOOL_SOURCE: &str = "memoria_tool";

const PREVIEW_CHARS: usize = 80;

/// Arguments for the store tool
#[derive(Debug, Clone, Deserialize)]
pub struct StoreArgs {
    /// Information to remember
    pub text: String,
    /// Explicit category; classified from the text when absent
    #[serde(default)]
    pub category: Option<MemoryCategory>,
}

/// Save a memory written by the agent
pub async fn store<G>(
    gateway: &G,
    session_key: Option<&str>,
    args: StoreArgs,
) -> Result<ToolOutput, GatewayError>
where
    G: MemoryGateway + ?Sized,
{
    let text = args.text.trim();
    if text.is_empty() {
        return Ok(ToolOutput::text("Provide text to store."));
    }

    let category = args.category.unwrap_or_else(|| classify(text));
    let custom_id = document_id_for(session_key);

    tracing::debug!(
        category = category.as_str(),
        custom_id = custom_id.as_deref().unwrap_or(""),
        "store tool"
    );

    let preview = limit_text(text, PREVIEW_CHARS);
    let request = AddMemoryRequest::new(text)
        .with_metadata("type", category.as_str())
        .with_metadata("source", TOOL_SOURCE)
        .with_custom_id(custom_id);

    gateway.add_memory(request).await?;

    Ok(ToolOutput::text(format!("Stored: \"{}\"", preview)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MetadataValue, RecordingGateway};

    #[tokio::test]
    async fn test_store_classifies_and_tags() {
        let gateway = RecordingGateway::new("tag");
        let args = StoreArgs {
            text: "I prefer dark roast coffee".to_string(),
            category: None,
        };

        let output = store(&gateway, Some("chat-9"), args).await.unwrap();
        assert_eq!(output.text, "Stored: \"I prefer dark roast coffee\"");

        let added = gateway.added();
        assert_eq!(
            added[0].metadata.get("type"),
            Some(&MetadataValue::Text("preference".to_string()))
        );
        assert_eq!(
            added[0].metadata.get("source"),
            Some(&MetadataValue::Text(TOOL_SOURCE.to_string()))
        );
        assert_eq!(added[0].custom_id.as_deref(), Some("session_chat_9"));
    }

    #[tokio::test]
    async fn test_store_explicit_category_and_long_preview() {
        let gateway = RecordingGateway::new("tag");
        let text = "x".repeat(120);
        let args: StoreArgs =
            serde_json::from_value(serde_json::json!({"text": text, "category": "decision"}))
                .unwrap();

        let output = store(&gateway, None, args).await.unwrap();
        assert_eq!(output.text, format!("Stored: \"{}…\"", "x".repeat(80)));
        assert_eq!(
            gateway.added()[0].metadata.get("type"),
            Some(&MetadataValue::Text("decision".to_string()))
        );
    }

    #[tokio::test]
    async fn test_store_propagates_backend_error() {
        let gateway = RecordingGateway::new("tag").failing_add();
        let args = StoreArgs {
            text: "anything".to_string(),
            category: None,
        };
        assert!(store(&gateway, None, args).await.is_err());
    }

    #[tokio::test]
    async fn test_store_blank_text_is_a_usage_message() {
        let gateway = RecordingGateway::new("tag");
        let args = StoreArgs {
            text: "   ".to_string(),
            category: None,
        };

        let output = store(&gateway, Some("chat"), args).await.unwrap();
        assert_eq!(output.text, "Provide text to store.");
        assert!(gateway.calls().is_empty());
    }
}
