//! # Hook API
//!
//! Lifecycle hooks the host agent calls around every turn. Hooks never fail
//! the turn: without an engine, or on backend errors, they answer with an
//! empty result.

use axum::{extract::State, routing::post, Json, Router};
use memoria_core::session::{AgentEndEvent, BeforeAgentStartEvent, HookContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::SharedState;

/// `before_agent_start` payload
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeforeAgentStartRequest {
    /// `{prompt, messages}` as emitted by the host
    #[serde(default)]
    #[schema(value_type = Object)]
    pub event: Value,
    /// Conversation the turn belongs to
    #[serde(default)]
    pub session_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecallResponse {
    /// Context block to prepend to the prompt, if any
    pub prepend_context: Option<String>,
}

/// `agent_end` payload
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentEndRequest {
    /// `{messages, success}` as emitted by the host
    #[serde(default)]
    #[schema(value_type = Object)]
    pub event: Value,
    /// Conversation the turn belongs to; the last recalled session when absent
    #[serde(default)]
    pub session_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureResponse {
    pub captured: bool,
}

pub fn hook_routes() -> Router<SharedState> {
    Router::new()
        .route("/before-agent-start", post(before_agent_start))
        .route("/agent-end", post(agent_end))
}

/// Recall context before the agent answers
#[utoipa::path(
    post,
    path = "/api/v1/hooks/before-agent-start",
    tag = "hooks",
    request_body = BeforeAgentStartRequest,
    responses(
        (status = 200, description = "Context to prepend (null when nothing recalled)", body = RecallResponse)
    )
)]
pub async fn before_agent_start(
    State(state): State<SharedState>,
    Json(req): Json<BeforeAgentStartRequest>,
) -> Json<RecallResponse> {
    let Some(engine) = state.engine.as_ref() else {
        return Json(RecallResponse {
            prepend_context: None,
        });
    };

    let event: BeforeAgentStartEvent = serde_json::from_value(req.event).unwrap_or_default();
    let ctx = HookContext {
        session_key: req.session_key,
    };

    let recalled = engine.recall(&event, &ctx).await;
    Json(RecallResponse {
        prepend_context: recalled.map(|r| r.prepend_context),
    })
}

/// Capture the finished turn
#[utoipa::path(
    post,
    path = "/api/v1/hooks/agent-end",
    tag = "hooks",
    request_body = AgentEndRequest,
    responses(
        (status = 200, description = "Whether the turn was stored", body = CaptureResponse)
    )
)]
pub async fn agent_end(
    State(state): State<SharedState>,
    Json(req): Json<AgentEndRequest>,
) -> Json<CaptureResponse> {
    let Some(engine) = state.engine.as_ref() else {
        return Json(CaptureResponse { captured: false });
    };

    let event: AgentEndEvent = serde_json::from_value(req.event).unwrap_or_default();
    let ctx = HookContext {
        session_key: req.session_key,
    };
    Json(CaptureResponse {
        captured: engine.capture(&event, &ctx).await,
    })
}
