//! # Capture Hook
//!
//! Persists the last conversational turn after the agent finishes. Capture
//! is best effort: backend failures are logged and never reach the host.

use super::events::{AgentEndEvent, ConversationMessage, Role};
use crate::config::{CaptureMode, MemoryConfig};
use crate::gateway::{AddMemoryRequest, MemoryGateway};
use crate::memory::context::strip_injected_context;
use crate::memory::identity::document_id_for;

/// Captured entries shorter than this are dropped in `all` mode
pub const MIN_CAPTURE_CHARS: usize = 10;

/// Source tag recorded on automatic captures
pub const CAPTURE_SOURCE: &str = "memoria";

/// Messages from the last user message to the end. Without any user
/// message the whole conversation counts as the last turn.
pub fn last_turn(messages: &[ConversationMessage]) -> &[ConversationMessage] {
    match messages.iter().rposition(|m| m.role == Role::User) {
        Some(idx) => &messages[idx..],
        None => messages,
    }
}

/// Render user/assistant messages as role-delimited text entries
pub fn render_turn(messages: &[ConversationMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| matches!(m.role, Role::User | Role::Assistant))
        .filter_map(|m| {
            let parts = m.text_parts();
            if parts.is_empty() {
                return None;
            }
            let role = m.role.as_str();
            Some(format!("[role: {}]\n{}\n[{}:end]", role, parts.join("\n"), role))
        })
        .collect()
}

/// Build the content to store for an `agent_end` event, if any
pub fn build_capture_content(event: &AgentEndEvent, mode: CaptureMode) -> Option<String> {
    if !event.success || event.messages.is_empty() {
        return None;
    }

    let texts = render_turn(last_turn(&event.messages));

    let captured: Vec<String> = match mode {
        CaptureMode::All => texts
            .iter()
            .map(|t| strip_injected_context(t).trim().to_string())
            .filter(|t| t.chars().count() >= MIN_CAPTURE_CHARS)
            .collect(),
        CaptureMode::Everything => texts,
    };

    if captured.is_empty() {
        None
    } else {
        Some(captured.join("\n\n"))
    }
}

/// Store the last turn of a finished agent run.
///
/// Returns whether a write was attempted and succeeded.
pub async fn capture<G>(
    gateway: &G,
    config: &MemoryConfig,
    session_key: Option<&str>,
    event: &AgentEndEvent,
) -> bool
where
    G: MemoryGateway + ?Sized,
{
    let Some(content) = build_capture_content(event, config.capture_mode) else {
        return false;
    };

    let custom_id = document_id_for(session_key);

    tracing::debug!(
        chars = content.len(),
        document = custom_id.as_deref().unwrap_or("no-session-key"),
        "capturing turn"
    );

    let request = AddMemoryRequest::new(content)
        .with_metadata("source", CAPTURE_SOURCE)
        .with_metadata("timestamp", chrono::Utc::now().to_rfc3339())
        .with_custom_id(custom_id);

    match gateway.add_memory(request).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("capture failed: {}", e);
            false
        }
    }
}
