//! # Parlay - Playground Output Reconciliation for Rust
//!
//! Parlay turns the raw event firehose of an LLM playground run into a
//! consistent, observable snapshot:
//!
//! - 🚀 **Streaming reconciliation** (text chunks and partial tool calls merged deterministically)
//! - 🔁 **Strict run lifecycle** (at most one terminal outcome per run, stale events dropped)
//! - 👀 **Observable snapshots** (subscribe/get-current-value store for presentation layers)
//! - ⚡ **Async/await** (built on Tokio)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlay::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut driver = RunDriver::new(Arc::new(TracingNotifier));
//!
//!     // Presentation layers subscribe once and read every update
//!     let mut updates = driver.store().subscribe();
//!
//!     // Drive a run from a subscription transport's event stream
//!     let events: EventStream = todo!("obtain from your transport");
//!     let snapshot = driver.run_streaming("run-1", events).await?;
//!
//!     if let Some(text) = snapshot.content.as_ref().and_then(|c| c.as_text()) {
//!         println!("{}", text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Parlay consists of two composable crates:
//!
//! - **parlay-types**: Core data model (ChatMessage, ToolCall, CompletionEvent)
//! - **parlay-output**: Reconciler, snapshot store, run driver, notifications

// Re-export all public APIs
pub use parlay_output as output;
pub use parlay_types as types;

// Re-export commonly used types
pub use parlay_output::{
    Notification, Notifier, OutputReconciler, OutputSnapshot, RunDriver, SnapshotStore,
};
pub use parlay_types::{ChatMessage, CompletionEvent, CompletionPayload, OutputContent, ToolCall};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::output::{
        EventStream, Notification, Notifier, OutputReconciler, OutputSnapshot, RunDriver,
        SnapshotStore, TracingNotifier,
    };
    pub use crate::types::{
        ChatMessage, CompletionEvent, CompletionPayload, OutputContent, ToolCall, ToolCallChunk,
    };
    pub use anyhow::Result;
}
