//! # Session State
//!
//! Holds the key of the conversation currently driving the engine. The
//! host's recall hook is the only writer; capture and the tools read it.

use std::sync::{Arc, RwLock};

/// Shared holder for the current session key
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current: Arc<RwLock<Option<String>>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the session the host is currently serving
    pub fn set(&self, session_key: impl Into<String>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session_key.into());
    }

    /// Key of the current session, if the host supplied one
    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
