//! The seam between the request handler and per-agent logic.

use a2a_types::Message;
use async_trait::async_trait;

use crate::runtime::event_queue::EventQueue;

/// What an executor needs to know about the request it serves.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub task_id: String,
    pub context_id: String,
    pub message: Message,
}

impl RequestContext {
    pub fn new(task_id: impl Into<String>, context_id: impl Into<String>, message: Message) -> Self {
        Self {
            task_id: task_id.into(),
            context_id: context_id.into(),
            message,
        }
    }

    /// First text part of the inbound message, or an empty string.
    pub fn user_text(&self) -> &str {
        self.message.first_text().unwrap_or_default()
    }
}

/// Per-agent business logic.
///
/// Executors report every outcome, failures included, through a
/// [`TaskUpdater`](crate::runtime::TaskUpdater) over `event_queue`; they never
/// return errors to the handler.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn execute(&self, context: RequestContext, event_queue: EventQueue);

    /// Best effort: marks the task canceled without interrupting running work.
    async fn cancel(&self, context: RequestContext, event_queue: EventQueue);
}
