//! # Profile Tool

use super::ToolOutput;
use crate::error::GatewayError;
use crate::gateway::MemoryGateway;
use crate::memory::context::{render_fact_section, PROFILE_HEADING, RECENT_HEADING};
use serde::Deserialize;
use serde_json::json;

/// Arguments for the profile tool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileArgs {
    /// Optional query to focus the profile
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn profile<G>(gateway: &G, args: ProfileArgs) -> Result<ToolOutput, GatewayError>
where
    G: MemoryGateway + ?Sized,
{
    tracing::debug!(query = args.query.as_deref().unwrap_or("(none)"), "profile tool");

    let profile = gateway.get_profile(args.query.as_deref(), None).await?;

    if profile.static_facts.is_empty() && profile.dynamic_facts.is_empty() {
        return Ok(ToolOutput::text("No profile information available yet."));
    }

    let mut sections = Vec::new();
    if !profile.static_facts.is_empty() {
        sections.push(render_fact_section(PROFILE_HEADING, &profile.static_facts));
    }
    if !profile.dynamic_facts.is_empty() {
        sections.push(render_fact_section(RECENT_HEADING, &profile.dynamic_facts));
    }

    Ok(ToolOutput::text(sections.join("\n\n")).with_details(json!({
        "staticCount": profile.static_facts.len(),
        "dynamicCount": profile.dynamic_facts.len(),
    })))
}
