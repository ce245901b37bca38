//! Memoria Server
//!
//! Axum server exposing the memory engine to a host agent over HTTP, plus a
//! small CLI for inspecting and wiping the configured container.

mod api;

use axum::{extract::State, response::Json, routing::get, Router};
use clap::{Parser, Subcommand};
use memoria_core::tools::score_suffix;
use memoria_core::{MemoryConfig, MemoryEngine, MemoryGateway, SupermemoryClient};
use serde::Serialize;
use std::{io::Write, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};

use api::ApiError;

/// Application state
pub struct AppState {
    pub config: MemoryConfig,
    /// `None` until an API key is configured
    pub engine: Option<MemoryEngine<dyn MemoryGateway>>,
}

impl AppState {
    /// The engine, or a 503 explaining how to configure one
    pub fn engine(&self) -> Result<&MemoryEngine<dyn MemoryGateway>, ApiError> {
        self.engine.as_ref().ok_or_else(ApiError::not_configured)
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Parser, Clone)]
#[command(author, version, about = "Memoria - Long-term memory for conversational agents")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the Memoria server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Show the resolved configuration
    Status,
    /// Search stored memories
    Search {
        /// Search query
        query: String,
        /// Max results
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Show the user profile
    Profile {
        /// Optional query to focus the profile
        query: Option<String>,
    },
    /// Delete ALL memories for the configured container tag
    Wipe {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

// === API Types ===

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    configured: bool,
    /// API key with the middle hidden
    api_key: Option<String>,
    container_tag: String,
    auto_recall: bool,
    auto_capture: bool,
    max_recall_results: usize,
    profile_frequency: usize,
    capture_mode: String,
    debug: bool,
    warnings: Vec<String>,
}

impl StatusResponse {
    fn from_config(config: &MemoryConfig) -> Self {
        Self {
            configured: config.is_configured(),
            api_key: config.redacted_api_key(),
            container_tag: config.container_tag.clone(),
            auto_recall: config.auto_recall,
            auto_capture: config.auto_capture,
            max_recall_results: config.max_recall_results,
            profile_frequency: config.profile_frequency,
            capture_mode: serde_json::to_value(config.capture_mode)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            debug: config.debug,
            warnings: config.validate_recall_config(),
        }
    }
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Memoria API",
        version = "1.0.0",
        description = "Long-term memory for conversational agents"
    ),
    paths(
        get_status,
        api::hooks::before_agent_start,
        api::hooks::agent_end,
        api::memory::search_memory,
        api::memory::store_memory,
        api::memory::forget_memory,
        api::memory::get_profile,
        api::memory::wipe_memories,
        api::memory::remember_command,
        api::memory::recall_command
    ),
    components(
        schemas(
            StatusResponse,
            api::ErrorResponse,
            api::hooks::BeforeAgentStartRequest,
            api::hooks::RecallResponse,
            api::hooks::AgentEndRequest,
            api::hooks::CaptureResponse,
            api::memory::MemorySearchRequest,
            api::memory::StoreRequest,
            api::memory::ForgetRequest,
            api::memory::ProfileRequest,
            api::memory::WipeRequest,
            api::memory::WipeResponse,
            api::memory::CommandRequest,
            api::memory::ToolResponse
        )
    ),
    tags(
        (name = "status", description = "Configuration status"),
        (name = "hooks", description = "Agent lifecycle hooks"),
        (name = "memory", description = "Memory tools and wipe"),
        (name = "commands", description = "Slash commands")
    )
)]
struct ApiDoc;

/// Get configuration status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "status",
    responses(
        (status = 200, description = "Resolved configuration", body = StatusResponse)
    )
)]
async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse::from_config(&state.config))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn app(state: SharedState) -> Router {
    Router::new()
        .nest("/api/v1/hooks", api::hooks::hook_routes())
        .nest("/api/v1/memory", api::memory::memory_routes())
        .nest("/api/v1/commands", api::memory::command_routes())
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/openapi.json", get(serve_openapi))
        .with_state(state)
}

fn init_tracing(debug: bool) {
    let default = if debug {
        "info,memoria_core=debug,memoria=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_engine(config: &MemoryConfig) -> anyhow::Result<Option<MemoryEngine<dyn MemoryGateway>>> {
    let Some(api_key) = config.api_key.as_deref() else {
        return Ok(None);
    };

    let client = SupermemoryClient::new(api_key, &config.container_tag)?.with_debug(config.debug);
    let gateway: Arc<dyn MemoryGateway> = Arc::new(client);
    Ok(Some(MemoryEngine::new(gateway, config.clone())))
}

fn require_engine(
    engine: Option<MemoryEngine<dyn MemoryGateway>>,
) -> anyhow::Result<MemoryEngine<dyn MemoryGateway>> {
    engine.ok_or_else(|| anyhow::anyhow!(api::NOT_CONFIGURED))
}

fn confirm_wipe(tag: &str) -> anyhow::Result<bool> {
    print!(
        "This will permanently delete all memories in \"{}\". Type \"yes\" to confirm: ",
        tag
    );
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

async fn run_server(state: SharedState, port: u16) -> anyhow::Result<()> {
    if state.engine.is_none() {
        tracing::info!(
            "memoria: not configured - set MEMORIA_API_KEY or apiKey in .memoria/config.json"
        );
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(
        container = %state.config.container_tag,
        "memoria server listening on http://{}",
        addr
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = MemoryConfig::load().await?;
    init_tracing(config.debug);

    for warning in config.validate_recall_config() {
        tracing::warn!("config warning: {}", warning);
    }

    let engine = build_engine(&config)?;

    match args.command.unwrap_or(CliCommand::Serve { port: 8080 }) {
        CliCommand::Serve { port } => {
            let state = Arc::new(AppState { config, engine });
            run_server(state, port).await
        }
        CliCommand::Status => {
            let status = StatusResponse::from_config(&config);
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        CliCommand::Search { query, limit } => {
            let engine = require_engine(engine)?;
            let results = engine.gateway().search(&query, limit, None).await?;
            if results.is_empty() {
                println!("No memories found.");
            }
            for r in results {
                println!("- {}{}", r.content, score_suffix(r.similarity));
            }
            Ok(())
        }
        CliCommand::Profile { query } => {
            let engine = require_engine(engine)?;
            let profile = engine.gateway().get_profile(query.as_deref(), None).await?;
            if profile.static_facts.is_empty() && profile.dynamic_facts.is_empty() {
                println!("No profile information available yet.");
                return Ok(());
            }
            if !profile.static_facts.is_empty() {
                println!("Stable Preferences:");
                for fact in &profile.static_facts {
                    println!("  - {}", fact);
                }
            }
            if !profile.dynamic_facts.is_empty() {
                println!("Recent Context:");
                for fact in &profile.dynamic_facts {
                    println!("  - {}", fact);
                }
            }
            Ok(())
        }
        CliCommand::Wipe { yes } => {
            let engine = require_engine(engine)?;
            let tag = engine.gateway().container_tag().to_string();
            if !yes && !confirm_wipe(&tag)? {
                println!("Aborted.");
                return Ok(());
            }
            match engine.wipe(None).await {
                Ok(summary) => {
                    println!("Wiped {} memories from \"{}\".", summary.deleted_count, tag);
                    Ok(())
                }
                Err(e) => {
                    eprintln!(
                        "Wipe of \"{}\" stopped after deleting {} memories.",
                        tag,
                        e.deleted_so_far()
                    );
                    Err(e.into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use memoria_core::gateway::{GatewayCall, ProfileResult, RecordingGateway, SearchResult};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn configured(gateway: Arc<RecordingGateway>) -> SharedState {
        let config = MemoryConfig {
            api_key: Some("sm_test_key_000000000000".to_string()),
            container_tag: "memoria_test".to_string(),
            ..MemoryConfig::default()
        };
        let dyn_gateway: Arc<dyn MemoryGateway> = gateway;
        Arc::new(AppState {
            engine: Some(MemoryEngine::new(dyn_gateway, config.clone())),
            config,
        })
    }

    fn unconfigured() -> SharedState {
        Arc::new(AppState {
            config: MemoryConfig::default(),
            engine: None,
        })
    }

    async fn post_json(state: SharedState, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_hooks_recall_and_capture() {
        let gateway = Arc::new(RecordingGateway::new("memoria_test").with_profile(ProfileResult {
            static_facts: vec!["likes tea".to_string()],
            ..ProfileResult::default()
        }));
        let state = configured(Arc::clone(&gateway));

        let (status, body) = post_json(
            state.clone(),
            "/api/v1/hooks/before-agent-start",
            json!({
                "event": {"prompt": "what should I drink?", "messages": []},
                "sessionKey": "agent:main"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["prependContext"]
            .as_str()
            .unwrap()
            .contains("- likes tea"));

        let (_, body) = post_json(
            state,
            "/api/v1/hooks/agent-end",
            json!({"event": {
                "success": true,
                "messages": [{"role": "user", "content": "I switched to green tea"}]
            }}),
        )
        .await;
        assert_eq!(body["captured"], true);
        assert_eq!(
            gateway.added()[0].custom_id.as_deref(),
            Some("session_agent_main")
        );
    }

    #[tokio::test]
    async fn test_interleaved_sessions_write_to_their_own_documents() {
        let gateway = Arc::new(RecordingGateway::new("memoria_test"));
        let state = configured(Arc::clone(&gateway));

        for session in ["alice", "bob"] {
            post_json(
                state.clone(),
                "/api/v1/hooks/before-agent-start",
                json!({"event": {"prompt": "good morning"}, "sessionKey": session}),
            )
            .await;
        }

        let (_, body) = post_json(
            state.clone(),
            "/api/v1/hooks/agent-end",
            json!({
                "event": {
                    "success": true,
                    "messages": [{"role": "user", "content": "Alice booked flights to Lisbon"}]
                },
                "sessionKey": "alice"
            }),
        )
        .await;
        assert_eq!(body["captured"], true);

        post_json(
            state.clone(),
            "/api/v1/memory/store",
            json!({"text": "Alice is vegetarian", "sessionKey": "alice"}),
        )
        .await;
        post_json(
            state.clone(),
            "/api/v1/commands/remember",
            json!({"args": "Alice's sister is called Ana", "sessionKey": "alice"}),
        )
        .await;
        post_json(
            state,
            "/api/v1/memory/store",
            json!({"text": "Bob collects vinyl records"}),
        )
        .await;

        let ids: Vec<Option<String>> = gateway
            .added()
            .into_iter()
            .map(|req| req.custom_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("session_alice".to_string()),
                Some("session_alice".to_string()),
                Some("session_alice".to_string()),
                Some("session_bob".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_server() {
        let (status, body) = post_json(
            unconfigured(),
            "/api/v1/hooks/before-agent-start",
            json!({"event": {"prompt": "hello there"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prependContext"], Value::Null);

        let (status, body) = post_json(
            unconfigured(),
            "/api/v1/memory/search",
            json!({"query": "tea"}),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], api::NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_memory_routes() {
        let gateway = Arc::new(RecordingGateway::new("memoria_test").with_search_results(vec![
            SearchResult {
                id: "m1".to_string(),
                content: "likes tea".to_string(),
                similarity: Some(0.9),
                metadata: None,
            },
        ]));
        let state = configured(Arc::clone(&gateway));

        let (_, body) =
            post_json(state.clone(), "/api/v1/memory/search", json!({"query": "tea"})).await;
        assert_eq!(body["text"], "Found 1 memories:\n\n1. likes tea (90%)");

        let (status, _) = post_json(
            state.clone(),
            "/api/v1/memory/store",
            json!({"text": "anything", "category": "bogus"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = post_json(
            state.clone(),
            "/api/v1/memory/forget",
            json!({"query": "tea"}),
        )
        .await;
        assert_eq!(body["text"], "Forgot: \"likes tea\"");

        let (_, body) = post_json(state, "/api/v1/commands/remember", json!({"args": ""})).await;
        assert_eq!(body["text"], "Usage: /remember <text to remember>");

        assert!(gateway
            .calls()
            .iter()
            .any(|call| matches!(call, GatewayCall::Delete { id, .. } if id == "m1")));
    }

    #[tokio::test]
    async fn test_wipe_reports_partial_progress() {
        let ids: Vec<String> = (0..150).map(|i| format!("doc_{}", i)).collect();
        let gateway = Arc::new(
            RecordingGateway::new("memoria_test")
                .with_documents(ids)
                .failing_bulk_batch(1),
        );

        let (status, body) = post_json(configured(gateway), "/api/v1/memory/wipe", json!({})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["deletedSoFar"], 100);
    }

    #[tokio::test]
    async fn test_status_and_openapi() {
        let response = app(unconfigured())
            .oneshot(Request::builder().uri("/api/v1/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let status: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status["configured"], false);
        assert_eq!(status["captureMode"], "all");

        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/v1/memory/wipe"));
        assert!(spec.paths.paths.contains_key("/api/v1/hooks/before-agent-start"));
    }
}
