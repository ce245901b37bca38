#![cfg(feature = "test-utils")]

//! End-to-end flows through `MemoryEngine` with a recording gateway:
//! a conversation recalled, answered and captured, then wiped.

use std::sync::Arc;

use memoria_core::gateway::{GatewayCall, ProfileResult, RecordingGateway, SearchHit};
use memoria_core::session::{AgentEndEvent, BeforeAgentStartEvent, HookContext};
use memoria_core::{MemoryConfig, MemoryEngine, WipeError};
use serde_json::json;

fn profile() -> ProfileResult {
    ProfileResult {
        static_facts: vec!["likes tea".to_string()],
        dynamic_facts: vec![],
        search_hits: vec![
            SearchHit {
                memory: Some("likes tea".to_string()),
                updated_at: None,
                similarity: Some(0.9),
            },
            SearchHit {
                memory: Some("visited Kyoto in spring".to_string()),
                updated_at: None,
                similarity: Some(0.61),
            },
        ],
    }
}

#[tokio::test]
async fn recall_then_capture_round_trip() {
    let gateway = Arc::new(RecordingGateway::new("memoria_test").with_profile(profile()));
    let engine = MemoryEngine::new(Arc::clone(&gateway), MemoryConfig::default());

    let start: BeforeAgentStartEvent = serde_json::from_value(json!({
        "prompt": "Any drink suggestions for my trip?",
        "messages": [{"role": "user", "content": "Any drink suggestions for my trip?"}]
    }))
    .unwrap();
    let ctx: HookContext = serde_json::from_value(json!({"sessionKey": "agent:main"})).unwrap();

    let recalled = engine.recall(&start, &ctx).await.expect("context injected");
    let block = &recalled.prepend_context;
    assert_eq!(block.matches("likes tea").count(), 1);
    assert!(block.contains("- visited Kyoto in spring [61%]"));

    let prompt_with_context = format!("{}\nAny drink suggestions for my trip?", block);
    let end: AgentEndEvent = serde_json::from_value(json!({
        "success": true,
        "messages": [
            {"role": "user", "content": "earlier question"},
            {"role": "assistant", "content": "earlier answer"},
            {"role": "user", "content": prompt_with_context},
            {"role": "assistant", "content": [
                {"type": "text", "text": "Try a matcha latte in Kyoto."},
                {"type": "tool_use", "name": "lookup"}
            ]}
        ]
    }))
    .unwrap();

    assert!(engine.capture(&end, &HookContext::default()).await);

    let added = gateway.added();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].custom_id.as_deref(), Some("session_agent_main"));
    assert_eq!(
        added[0].content,
        "[role: user]\nAny drink suggestions for my trip?\n[user:end]\n\n\
         [role: assistant]\nTry a matcha latte in Kyoto.\n[assistant:end]"
    );
}

#[tokio::test]
async fn wipe_surfaces_partial_progress() {
    let ids: Vec<String> = (0..250).map(|i| format!("doc_{}", i)).collect();
    let gateway = Arc::new(
        RecordingGateway::new("memoria_test")
            .with_documents(ids)
            .failing_bulk_batch(2),
    );
    let engine = MemoryEngine::new(Arc::clone(&gateway), MemoryConfig::default());

    let err = engine.wipe(None).await.unwrap_err();
    assert!(matches!(
        err,
        WipeError::BatchFailed {
            batch_index: 2,
            deleted_so_far: 200,
            ..
        }
    ));
    assert_eq!(err.deleted_so_far(), 200);

    let lists = gateway
        .calls()
        .into_iter()
        .filter(|call| matches!(call, GatewayCall::List { .. }))
        .count();
    assert_eq!(lists, 3);
}
