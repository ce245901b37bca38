//! # Memory Tools
//!
//! Operations the agent (or the user, through slash commands) invokes
//! explicitly, as opposed to the automatic recall/capture hooks.
//!
//! ## Modules
//!
//! - `store` - Save a memory with a category
//! - `search` - Similarity search over stored memories
//! - `forget` - Delete by id, or search-then-delete by description
//! - `profile` - Stable and recent facts about the user
//! - `commands` - `/remember` and `/recall`

pub mod commands;
pub mod forget;
pub mod profile;
pub mod search;
pub mod store;

pub use forget::{ForgetArgs, ForgetOutcome};
pub use profile::ProfileArgs;
pub use search::SearchArgs;
pub use store::StoreArgs;

use serde::Serialize;
use serde_json::Value;

/// Text shown to the agent plus optional structured details
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Similarity as a rounded percentage suffix, e.g. ` (87%)`.
/// Missing or zero similarity renders nothing.
pub fn score_suffix(similarity: Option<f64>) -> String {
    match similarity {
        Some(s) if s > 0.0 => format!(" ({:.0}%)", s * 100.0),
        _ => String::new(),
    }
}
