//! # Memory API
//!
//! Explicit memory tools, slash commands and the container wipe.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use memoria_core::memory::MemoryCategory;
use memoria_core::session::HookContext;
use memoria_core::tools::{ForgetArgs, ProfileArgs, SearchArgs, StoreArgs, ToolOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct MemorySearchRequest {
    pub query: String,
    /// Maximum results (default 5)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub text: String,
    /// preference, fact, decision, entity or other; classified when absent
    #[serde(default)]
    pub category: Option<String>,
    /// Conversation whose document receives the memory
    #[serde(default)]
    pub session_key: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgetRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub memory_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProfileRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WipeRequest {
    /// Container to wipe; the configured one when absent
    #[serde(default)]
    pub container_tag: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WipeResponse {
    pub container_tag: String,
    pub deleted_count: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Everything after the command name
    #[serde(default)]
    pub args: String,
    /// Conversation the command was typed in
    #[serde(default)]
    pub session_key: Option<String>,
}

fn hook_context(session_key: Option<String>) -> HookContext {
    HookContext { session_key }
}

/// Text for the agent plus structured details
#[derive(Debug, Serialize, ToSchema)]
pub struct ToolResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl From<ToolOutput> for ToolResponse {
    fn from(output: ToolOutput) -> Self {
        Self {
            text: output.text,
            details: output.details,
        }
    }
}

pub fn memory_routes() -> Router<SharedState> {
    Router::new()
        .route("/search", post(search_memory))
        .route("/store", post(store_memory))
        .route("/forget", post(forget_memory))
        .route("/profile", post(get_profile))
        .route("/wipe", post(wipe_memories))
}

pub fn command_routes() -> Router<SharedState> {
    Router::new()
        .route("/remember", post(remember_command))
        .route("/recall", post(recall_command))
}

/// Search long-term memories
#[utoipa::path(
    post,
    path = "/api/v1/memory/search",
    tag = "memory",
    request_body = MemorySearchRequest,
    responses(
        (status = 200, description = "Search results", body = ToolResponse),
        (status = 503, description = "No API key configured", body = super::ErrorResponse)
    )
)]
pub async fn search_memory(
    State(state): State<SharedState>,
    Json(req): Json<MemorySearchRequest>,
) -> Result<Json<ToolResponse>, ApiError> {
    let engine = state.engine()?;
    let output = engine
        .search(SearchArgs {
            query: req.query,
            limit: req.limit,
        })
        .await?;
    Ok(Json(output.into()))
}

/// Save a memory
#[utoipa::path(
    post,
    path = "/api/v1/memory/store",
    tag = "memory",
    request_body = StoreRequest,
    responses(
        (status = 200, description = "Memory stored", body = ToolResponse),
        (status = 400, description = "Unknown category", body = super::ErrorResponse)
    )
)]
pub async fn store_memory(
    State(state): State<SharedState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<ToolResponse>, ApiError> {
    let engine = state.engine()?;
    let category = req
        .category
        .as_deref()
        .map(str::parse::<MemoryCategory>)
        .transpose()
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;

    let output = engine
        .store(
            StoreArgs {
                text: req.text,
                category,
            },
            &hook_context(req.session_key),
        )
        .await?;
    Ok(Json(output.into()))
}

/// Forget a memory by id or description
#[utoipa::path(
    post,
    path = "/api/v1/memory/forget",
    tag = "memory",
    request_body = ForgetRequest,
    responses(
        (status = 200, description = "Outcome message", body = ToolResponse)
    )
)]
pub async fn forget_memory(
    State(state): State<SharedState>,
    Json(req): Json<ForgetRequest>,
) -> Result<Json<ToolResponse>, ApiError> {
    let engine = state.engine()?;
    let output = engine
        .forget(ForgetArgs {
            query: req.query,
            memory_id: req.memory_id,
        })
        .await?;
    Ok(Json(output.into()))
}

/// Stable and recent facts about the user
#[utoipa::path(
    post,
    path = "/api/v1/memory/profile",
    tag = "memory",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile sections", body = ToolResponse)
    )
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ToolResponse>, ApiError> {
    let engine = state.engine()?;
    let output = engine.profile(ProfileArgs { query: req.query }).await?;
    Ok(Json(output.into()))
}

/// Delete every memory in a container
#[utoipa::path(
    post,
    path = "/api/v1/memory/wipe",
    tag = "memory",
    request_body = WipeRequest,
    responses(
        (status = 200, description = "Wipe finished", body = WipeResponse),
        (status = 502, description = "Wipe aborted; body carries deletedSoFar", body = super::ErrorResponse)
    )
)]
pub async fn wipe_memories(
    State(state): State<SharedState>,
    Json(req): Json<WipeRequest>,
) -> Result<Json<WipeResponse>, ApiError> {
    let engine = state.engine()?;
    let container_tag = req
        .container_tag
        .unwrap_or_else(|| engine.gateway().container_tag().to_string());

    let summary = engine.wipe(Some(&container_tag)).await?;
    Ok(Json(WipeResponse {
        container_tag,
        deleted_count: summary.deleted_count,
    }))
}

/// `/remember <text>`
#[utoipa::path(
    post,
    path = "/api/v1/commands/remember",
    tag = "commands",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command reply", body = ToolResponse)
    )
)]
pub async fn remember_command(
    State(state): State<SharedState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<ToolResponse>, ApiError> {
    let engine = state.engine()?;
    let ctx = hook_context(req.session_key);
    Ok(Json(engine.remember_command(&req.args, &ctx).await.into()))
}

/// `/recall <query>`
#[utoipa::path(
    post,
    path = "/api/v1/commands/recall",
    tag = "commands",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command reply", body = ToolResponse)
    )
)]
pub async fn recall_command(
    State(state): State<SharedState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<ToolResponse>, ApiError> {
    let engine = state.engine()?;
    Ok(Json(engine.recall_command(&req.args).await.into()))
}
