//! # Memory Engine
//!
//! The single object a host talks to. Owns the gateway, the resolved
//! configuration and the current session key, and exposes the hook, tool
//! and administrative entry points.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memoria_core::{MemoryConfig, MemoryEngine, SupermemoryClient};
//! use std::sync::Arc;
//!
//! let config = MemoryConfig::load().await?;
//! let client = SupermemoryClient::new(api_key, &config.container_tag)?;
//! let engine = MemoryEngine::new(Arc::new(client), config);
//! let summary = engine.wipe(None).await?;
//! ```

use crate::config::MemoryConfig;
use crate::error::{GatewayError, WipeError};
use crate::gateway::MemoryGateway;
use crate::memory::lifecycle::{wipe_container, WipeSummary};
use crate::session::{
    self, AgentEndEvent, BeforeAgentStartEvent, HookContext, RecallOutput, SessionState,
};
use crate::tools::{
    self, ForgetArgs, ForgetOutcome, ProfileArgs, SearchArgs, StoreArgs, ToolOutput,
};
use std::sync::Arc;

/// Memory recall-and-lifecycle engine
pub struct MemoryEngine<G: MemoryGateway + ?Sized> {
    gateway: Arc<G>,
    config: MemoryConfig,
    session: SessionState,
}

impl<G: MemoryGateway + ?Sized> Clone for MemoryEngine<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: self.config.clone(),
            session: self.session.clone(),
        }
    }
}

impl<G: MemoryGateway + ?Sized> MemoryEngine<G> {
    pub fn new(gateway: Arc<G>, config: MemoryConfig) -> Self {
        Self {
            gateway,
            config,
            session: SessionState::new(),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Key of the session the host is currently serving
    pub fn session_key(&self) -> Option<String> {
        self.session.current()
    }

    /// Session a call belongs to: the caller's key when it names one, else
    /// the last session seen by `recall`
    fn session_for(&self, ctx: &HookContext) -> Option<String> {
        ctx.session_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.session.current())
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    /// `before_agent_start`: remember the session, then recall context.
    ///
    /// The session key is tracked even when auto-recall is off so captures
    /// and stores still land on the per-session document.
    pub async fn recall(
        &self,
        event: &BeforeAgentStartEvent,
        ctx: &HookContext,
    ) -> Option<RecallOutput> {
        if let Some(key) = ctx.session_key.as_deref().filter(|k| !k.is_empty()) {
            self.session.set(key);
        }

        if !self.config.auto_recall {
            return None;
        }

        session::recall(self.gateway.as_ref(), &self.config, event).await
    }

    /// `agent_end`: store the last turn. Returns whether anything was stored.
    pub async fn capture(&self, event: &AgentEndEvent, ctx: &HookContext) -> bool {
        if !self.config.auto_capture {
            return false;
        }

        let key = self.session_for(ctx);
        session::capture(self.gateway.as_ref(), &self.config, key.as_deref(), event).await
    }

    // ========================================================================
    // Administrative entry points
    // ========================================================================

    /// Forget the memory closest to `text`
    pub async fn forget_by_query(&self, text: &str) -> ForgetOutcome {
        let query = text.trim();
        if query.is_empty() {
            return ForgetOutcome::failed("Usage: forget <description of the memory>");
        }

        match tools::forget::forget_by_query(self.gateway.as_ref(), query, None).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("forget failed: {}", e);
                ForgetOutcome::failed("Failed to forget memory. Check logs for details.")
            }
        }
    }

    /// Delete every document in `tag` (the configured container by default)
    pub async fn wipe(&self, tag: Option<&str>) -> Result<WipeSummary, WipeError> {
        let tag = tag.unwrap_or_else(|| self.gateway.container_tag());
        tracing::info!(container = tag, "wiping container");

        wipe_container(self.gateway.as_ref(), tag).await
    }

    // ========================================================================
    // Tools and commands
    // ========================================================================

    pub async fn store(
        &self,
        args: StoreArgs,
        ctx: &HookContext,
    ) -> Result<ToolOutput, GatewayError> {
        let key = self.session_for(ctx);
        tools::store::store(self.gateway.as_ref(), key.as_deref(), args).await
    }

    pub async fn search(&self, args: SearchArgs) -> Result<ToolOutput, GatewayError> {
        tools::search::search(self.gateway.as_ref(), args).await
    }

    pub async fn forget(&self, args: ForgetArgs) -> Result<ToolOutput, GatewayError> {
        tools::forget::forget(self.gateway.as_ref(), args).await
    }

    pub async fn profile(&self, args: ProfileArgs) -> Result<ToolOutput, GatewayError> {
        tools::profile::profile(self.gateway.as_ref(), args).await
    }

    /// `/remember <text>`
    pub async fn remember_command(&self, args: &str, ctx: &HookContext) -> ToolOutput {
        let key = self.session_for(ctx);
        tools::commands::remember(self.gateway.as_ref(), key.as_deref(), args).await
    }

    /// `/recall <query>`
    pub async fn recall_command(&self, args: &str) -> ToolOutput {
        tools::commands::recall(self.gateway.as_ref(), args).await
    }
}
