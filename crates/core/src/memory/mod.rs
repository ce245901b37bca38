//! # Memory Module
//!
//! The recall-and-lifecycle engine: pure logic that sits between the
//! conversation hooks and the memory gateway.
//!
//! ## Architecture
//!
//! ```text
//! captured text ── category ── identity ──► gateway.add_memory
//!
//! prompt ── schedule ──► gateway.get_profile ── context ──► prepended block
//!
//! wipe ── lifecycle ──► gateway.list_documents / gateway.delete_bulk
//! ```

pub mod category;
pub mod context;
pub mod identity;
pub mod lifecycle;
pub mod schedule;

pub use category::{classify, MemoryCategory};
pub use context::{assemble_context, strip_injected_context};
pub use identity::document_id;
pub use lifecycle::{wipe_container, WipeSummary};
pub use schedule::should_include_full_profile;
