//! Server side of the A2A task methods.
//!
//! `message/send` records a `submitted` task, then runs the executor in its own
//! tokio task. A second task drains the executor's event queue into the store,
//! so `tasks/get` callers see each transition as soon as it is applied.

use std::sync::Arc;

use a2a_types::{Message, MessageRole, MessageSendParams, Task, TaskIdParams, TaskQueryParams};
use tokio::task::JoinHandle;

use crate::errors::{AgentError, AgentResult};
use crate::runtime::event_queue::{EventQueue, EventReceiver, TaskEvent};
use crate::runtime::executor::{AgentExecutor, RequestContext};
use crate::runtime::status_mapper::{self, submitted_status};
use crate::runtime::task_store::{TaskPatch, TaskStore};

#[derive(Clone)]
pub struct DefaultRequestHandler {
    store: Arc<dyn TaskStore>,
    executor: Arc<dyn AgentExecutor>,
}

impl DefaultRequestHandler {
    pub fn new(store: Arc<dyn TaskStore>, executor: Arc<dyn AgentExecutor>) -> Self {
        Self { store, executor }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Creates a task for the inbound message and starts the executor.
    ///
    /// Returns the `submitted` snapshot, or the finished task when the caller
    /// asked for a blocking send.
    pub async fn on_send_message(&self, params: MessageSendParams) -> AgentResult<Task> {
        let blocking = params.is_blocking();
        let mut message = params.message;

        if message.first_text().is_none() {
            return Err(AgentError::InvalidInput(
                "message must contain a text part".to_string(),
            ));
        }
        if message.role != MessageRole::User {
            tracing::warn!(message_id = %message.message_id, "inbound message is not from a user");
        }

        let task_id = uuid::Uuid::new_v4().to_string();
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        message.context_id = Some(context_id.clone());
        message.task_id = Some(task_id.clone());

        let task = Task {
            kind: a2a_types::TASK_KIND.to_string(),
            id: task_id.clone(),
            context_id: context_id.clone(),
            status: submitted_status(),
            history: vec![message.clone()],
            metadata: params.metadata,
        };
        self.store.create(task.clone()).await?;
        tracing::info!(task_id = %task_id, context_id = %context_id, "task submitted");

        let context = RequestContext::new(task_id, context_id, message);
        let run = self.spawn_execution(context);

        if blocking {
            run.await?;
            return self.store.get(&task.id).await;
        }
        Ok(task)
    }

    pub async fn on_get_task(&self, params: TaskQueryParams) -> AgentResult<Task> {
        let mut task = self.store.get(&params.id).await?;
        if let Some(limit) = params.history_length {
            let keep = usize::try_from(limit.max(0)).unwrap_or(0);
            let skip = task.history.len().saturating_sub(keep);
            task.history.drain(..skip);
        }
        Ok(task)
    }

    /// Marks a running task canceled. Work already in flight keeps running,
    /// but its later status updates are rejected by the store.
    pub async fn on_cancel_task(&self, params: TaskIdParams) -> AgentResult<Task> {
        let task = self.store.get(&params.id).await?;
        if task.status.state.is_terminal() {
            return Err(AgentError::TaskNotCancelable {
                task_id: task.id,
                state: task.status.state.to_string(),
            });
        }

        let message = task
            .history
            .iter()
            .find(|message| message.role == MessageRole::User)
            .cloned()
            .unwrap_or_else(|| {
                Message::with_parts(uuid::Uuid::new_v4().to_string(), MessageRole::User, Vec::new())
            });
        let context = RequestContext::new(task.id.clone(), task.context_id.clone(), message);

        let (queue, receiver) = EventQueue::new(task.id.clone());
        self.executor.cancel(context, queue).await;
        drain_events(Arc::clone(&self.store), receiver).await;

        let task = self.store.get(&params.id).await?;
        tracing::info!(task_id = %task.id, state = %task.status.state, "cancel requested");
        Ok(task)
    }

    /// Runs the executor and the drain side by side. The returned handle
    /// resolves once both are done.
    fn spawn_execution(&self, context: RequestContext) -> JoinHandle<()> {
        let task_id = context.task_id.clone();
        let context_id = context.context_id.clone();
        let (queue, receiver) = EventQueue::new(task_id.clone());

        let executor = Arc::clone(&self.executor);
        let execution = tokio::spawn(async move { executor.execute(context, queue).await });
        let drain = tokio::spawn(drain_events(Arc::clone(&self.store), receiver));

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let outcome = execution.await;
            if let Err(e) = drain.await {
                tracing::error!(task_id = %task_id, error = %e, "event drain stopped");
            }

            if let Err(e) = outcome {
                tracing::error!(task_id = %task_id, error = %e, "executor did not finish");
                let message = Message::agent_text(
                    uuid::Uuid::new_v4().to_string(),
                    format!("Error while processing the request: executor panicked ({e})"),
                )
                .with_task_id(&task_id)
                .with_context_id(context_id);
                let failed = status_mapper::status(a2a_types::TaskState::Failed, Some(message));
                if let Err(e) = store.update(&task_id, TaskPatch::status(failed)).await {
                    tracing::error!(task_id = %task_id, error = %e, "could not mark task failed");
                }
            }
        })
    }
}

/// Applies queued events to the store until every sender is gone.
async fn drain_events(store: Arc<dyn TaskStore>, mut receiver: EventReceiver) {
    while let Some(event) = receiver.recv().await {
        let Some(task_id) = event.task_id().map(str::to_string) else {
            tracing::warn!("dropping event without a task id");
            continue;
        };

        let patch = match event {
            TaskEvent::StatusUpdate(update) => TaskPatch::status(update.status),
            TaskEvent::Message(message) => TaskPatch::message(message),
        };

        match store.update(&task_id, patch).await {
            Ok(task) => {
                tracing::debug!(task_id = %task_id, state = %task.status.state, "event applied");
            }
            Err(e) => {
                tracing::error!(task_id = %task_id, error = %e, "event rejected by task store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::task_store::InMemoryTaskStore;
    use crate::runtime::task_updater::TaskUpdater;
    use a2a_types::{MessageSendConfiguration, TaskState};
    use async_trait::async_trait;

    /// Echoes the inbound text back as the completion message.
    struct EchoExecutor;

    #[async_trait]
    impl AgentExecutor for EchoExecutor {
        async fn execute(&self, context: RequestContext, event_queue: EventQueue) {
            let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
            updater.submit().unwrap();
            updater.start_work().unwrap();
            updater.complete(format!("echo: {}", context.user_text())).unwrap();
        }

        async fn cancel(&self, context: RequestContext, event_queue: EventQueue) {
            let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
            updater.cancel("stopped").unwrap();
        }
    }

    struct PanickingExecutor;

    #[async_trait]
    impl AgentExecutor for PanickingExecutor {
        async fn execute(&self, _context: RequestContext, _event_queue: EventQueue) {
            panic!("executor bug");
        }

        async fn cancel(&self, _context: RequestContext, _event_queue: EventQueue) {}
    }

    fn handler(executor: impl AgentExecutor + 'static) -> DefaultRequestHandler {
        DefaultRequestHandler::new(Arc::new(InMemoryTaskStore::new()), Arc::new(executor))
    }

    fn blocking(text: &str) -> MessageSendParams {
        let mut params = MessageSendParams::new(Message::user_text("m-1", text));
        params.configuration = Some(MessageSendConfiguration {
            blocking: Some(true),
            ..MessageSendConfiguration::default()
        });
        params
    }

    #[tokio::test]
    async fn send_returns_submitted_snapshot() {
        let handler = handler(EchoExecutor);
        let task = handler
            .on_send_message(MessageSendParams::new(Message::user_text("m-1", "hi")))
            .await
            .unwrap();

        assert_eq!(task.status.state, TaskState::Submitted);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].task_id.as_deref(), Some(task.id.as_str()));
    }

    #[tokio::test]
    async fn blocking_send_returns_final_task() {
        let handler = handler(EchoExecutor);
        let task = handler.on_send_message(blocking("hi")).await.unwrap();

        assert_eq!(task.status.state, TaskState::Completed);
        assert_eq!(task.status.message_text(), Some("echo: hi"));
    }

    #[tokio::test]
    async fn context_id_is_kept_from_message() {
        let handler = handler(EchoExecutor);
        let message = Message::user_text("m-1", "hi").with_context_id("ctx-42");
        let task = handler
            .on_send_message(MessageSendParams::new(message))
            .await
            .unwrap();
        assert_eq!(task.context_id, "ctx-42");
    }

    #[tokio::test]
    async fn message_without_text_is_invalid() {
        let handler = handler(EchoExecutor);
        let message = Message::with_parts("m-1", MessageRole::User, Vec::new());
        let err = handler
            .on_send_message(MessageSendParams::new(message))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn history_length_keeps_latest_entries() {
        let handler = handler(EchoExecutor);
        let task = handler.on_send_message(blocking("hi")).await.unwrap();

        let mut query = TaskQueryParams::new(task.id.clone());
        query.history_length = Some(0);
        let truncated = handler.on_get_task(query).await.unwrap();
        assert!(truncated.history.is_empty());

        let full = handler.on_get_task(TaskQueryParams::new(task.id)).await.unwrap();
        assert_eq!(full.history.len(), 1);
    }

    #[tokio::test]
    async fn completed_task_cannot_be_canceled() {
        let handler = handler(EchoExecutor);
        let task = handler.on_send_message(blocking("hi")).await.unwrap();

        let err = handler
            .on_cancel_task(TaskIdParams::new(task.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::TaskNotCancelable { .. }));
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let handler = handler(EchoExecutor);
        let err = handler
            .on_get_task(TaskQueryParams::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::TaskNotFound { .. }));
    }

    #[tokio::test]
    async fn panicking_executor_fails_the_task() {
        let handler = handler(PanickingExecutor);
        let task = handler.on_send_message(blocking("hi")).await.unwrap();
        assert_eq!(task.status.state, TaskState::Failed);

        let message = task.status.message.as_ref().unwrap();
        assert_eq!(message.role, MessageRole::Agent);
        assert_eq!(message.task_id.as_deref(), Some(task.id.as_str()));
        assert_eq!(message.context_id.as_deref(), Some(task.context_id.as_str()));
        assert!(task
            .status
            .message_text()
            .unwrap()
            .starts_with("Error while processing the request: executor panicked"));
    }
}
