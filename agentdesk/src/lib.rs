//! Two cooperating A2A agents for AI Solutions Corp.
//!
//! The company expert answers product questions with document search and a
//! calculator. The sales manager consults the expert over A2A, then drafts a
//! reply to an inbound customer email. Both are served by the same runtime:
//! an in-memory task store, per-task event queues, and an axum JSON-RPC server.

pub mod agents;
pub mod config;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod tools;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use a2a_types as a2a;

pub use errors::{AgentError, AgentResult};
pub use runtime::{AgentServer, DefaultRequestHandler, InMemoryTaskStore, TaskStore};
