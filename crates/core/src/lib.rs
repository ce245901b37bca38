//! # Memoria Core
//!
//! Persistent, recallable memory for a conversational agent. Conversation
//! turns are captured into a hosted memory service and the relevant facts
//! are recalled into the agent's context before it answers.
//!
//! ## Architecture
//!
//! - `memory/` - Classification, session identity, context assembly, recall
//!   schedule and bulk wipe
//! - `gateway/` - The `MemoryGateway` seam and its Supermemory REST client
//! - `session/` - Host events and the automatic recall/capture hooks
//! - `tools/` - Explicit store/search/forget/profile tools and slash commands
//! - `engine` - `MemoryEngine`, the entry point hosts talk to
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memoria_core::{MemoryConfig, MemoryEngine, SupermemoryClient};
//!
//! let config = MemoryConfig::load().await?;
//! let client = SupermemoryClient::new(&api_key, &config.container_tag)?;
//! let engine = MemoryEngine::new(Arc::new(client), config);
//! let recalled = engine.recall(&event, &ctx).await;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod session;
pub mod tools;

pub use config::MemoryConfig;
pub use engine::MemoryEngine;
pub use error::{ConfigError, GatewayError, WipeError};
pub use gateway::{MemoryGateway, SupermemoryClient};
