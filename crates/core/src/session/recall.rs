//! # Recall Hook
//!
//! Runs before the agent answers a prompt and returns the context block to
//! prepend, if there is anything worth recalling.

use super::events::BeforeAgentStartEvent;
use crate::config::MemoryConfig;
use crate::gateway::MemoryGateway;
use crate::memory::context::assemble_context;
use crate::memory::schedule::{count_user_turns, needs_recall, should_include_full_profile};
use serde::Serialize;

/// Result handed back to the host
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecallOutput {
    pub prepend_context: String,
}

pub async fn recall<G>(
    gateway: &G,
    config: &MemoryConfig,
    event: &BeforeAgentStartEvent,
) -> Option<RecallOutput>
where
    G: MemoryGateway + ?Sized,
{
    let prompt = event.prompt.as_deref().filter(|p| needs_recall(p))?;

    let turn = count_user_turns(&event.messages);
    let include_profile = should_include_full_profile(turn, config.effective_profile_frequency());

    tracing::debug!(turn, include_profile, "recalling");

    let profile = match gateway.get_profile(Some(prompt), None).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("recall failed: {}", e);
            return None;
        }
    };

    let (static_facts, dynamic_facts): (&[String], &[String]) = if include_profile {
        (&profile.static_facts, &profile.dynamic_facts)
    } else {
        (&[], &[])
    };

    let Some(context) = assemble_context(
        static_facts,
        dynamic_facts,
        &profile.search_hits,
        config.max_recall_results,
    ) else {
        tracing::debug!("no profile data to inject");
        return None;
    };

    tracing::debug!(chars = context.len(), turn, "injecting context");
    Some(RecallOutput {
        prepend_context: context,
    })
}
