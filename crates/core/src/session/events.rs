//! # Conversation Events
//!
//! Typed views of the events the host runtime sends. Host payloads are
//! loosely shaped JSON; they are validated here so the rest of the crate
//! only sees well-formed messages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Author of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// system, tool and anything else the host emits
    #[serde(other)]
    Other,
}

impl Role {
    fn parse(raw: &str) -> Self {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other => "other",
        }
    }
}

/// One block of structured message content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    /// images, tool calls, tool results
    #[serde(other)]
    Other,
}

impl ContentBlock {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        match (obj.get("type").and_then(Value::as_str), obj.get("text")) {
            (Some("text"), Some(Value::String(text))) => {
                Some(ContentBlock::Text { text: text.clone() })
            }
            _ => Some(ContentBlock::Other),
        }
    }
}

/// Message body: either plain text or a list of blocks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A validated conversation message
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ConversationMessage {
    /// Create a plain-text message
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Validate a loosely-typed host message.
    ///
    /// Returns `None` when the value is not an object or has no string role.
    /// Unknown content shapes become an empty block list.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let role = Role::parse(obj.get("role")?.as_str()?);
        let content = match obj.get("content") {
            Some(Value::String(text)) => MessageContent::Text(text.clone()),
            Some(Value::Array(items)) => {
                MessageContent::Blocks(items.iter().filter_map(ContentBlock::from_value).collect())
            }
            _ => MessageContent::Blocks(Vec::new()),
        };
        Some(Self { role, content })
    }

    /// Text fragments of this message, in order
    pub fn text_parts(&self) -> Vec<&str> {
        match &self.content {
            MessageContent::Text(text) => vec![text.as_str()],
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    ContentBlock::Other => None,
                })
                .collect(),
        }
    }
}

/// Validate a list of host messages, dropping malformed entries
pub fn parse_messages(values: &[Value]) -> Vec<ConversationMessage> {
    values.iter().filter_map(ConversationMessage::from_value).collect()
}

fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<ConversationMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| parse_messages(items))
        .unwrap_or_default())
}

/// Emitted by the host after the agent finished a turn
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentEndEvent {
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<ConversationMessage>,
    #[serde(default)]
    pub success: bool,
}

/// Emitted by the host before the agent starts answering a prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeforeAgentStartEvent {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<ConversationMessage>,
}

/// Routing context the host attaches to hook calls
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    #[serde(default)]
    pub session_key: Option<String>,
}
