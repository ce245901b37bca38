//! # Session Module
//!
//! Host conversation events and the two automatic hooks that run on them:
//! recall before the agent answers, capture after it finishes.

pub mod capture;
pub mod events;
pub mod recall;
pub mod state;

pub use capture::capture;
pub use events::{AgentEndEvent, BeforeAgentStartEvent, ConversationMessage, HookContext, Role};
pub use recall::{recall, RecallOutput};
pub use state::SessionState;
