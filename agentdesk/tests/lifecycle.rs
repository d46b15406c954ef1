//! Task lifecycle through the request handler and the expert executor.

use std::sync::{Arc, Mutex};

use agentdesk::a2a::{
    Message, MessageSendConfiguration, MessageSendParams, Task, TaskIdParams, TaskQueryParams, TaskState,
};
use agentdesk::agents::expert::{ExpertAgent, ExpertExecutor};
use agentdesk::models::LlmResponse;
use agentdesk::runtime::{AgentExecutor, EventQueue, RequestContext, TaskPatch, TaskUpdater};
use agentdesk::test_support::FakeLlm;
use agentdesk::tools::DocumentSearchTool;
use agentdesk::{AgentError, AgentResult, DefaultRequestHandler, InMemoryTaskStore, TaskStore};
use async_trait::async_trait;
use tokio::sync::Notify;

/// Records the state of every status patch that reaches the store.
#[derive(Default)]
struct RecordingStore {
    inner: InMemoryTaskStore,
    states: Mutex<Vec<TaskState>>,
}

impl RecordingStore {
    fn states(&self) -> Vec<TaskState> {
        self.states.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskStore for RecordingStore {
    async fn create(&self, task: Task) -> AgentResult<String> {
        self.inner.create(task).await
    }

    async fn get(&self, task_id: &str) -> AgentResult<Task> {
        self.inner.get(task_id).await
    }

    async fn update(&self, task_id: &str, patch: TaskPatch) -> AgentResult<Task> {
        let state = patch.status.as_ref().map(|status| status.state);
        let updated = self.inner.update(task_id, patch).await?;
        if let Some(state) = state {
            self.states.lock().unwrap().push(state);
        }
        Ok(updated)
    }

    async fn list_context(&self, context_id: &str) -> AgentResult<Vec<Task>> {
        self.inner.list_context(context_id).await
    }
}

fn expert(responses: Vec<AgentResult<LlmResponse>>) -> ExpertExecutor {
    let llm = FakeLlm::with_responses("fake", responses);
    ExpertExecutor::new(ExpertAgent::new(Arc::new(llm), DocumentSearchTool::unavailable()))
}

fn blocking(text: &str) -> MessageSendParams {
    let mut params = MessageSendParams::new(Message::user_text(uuid::Uuid::new_v4().to_string(), text));
    params.configuration = Some(MessageSendConfiguration {
        blocking: Some(true),
        ..Default::default()
    });
    params
}

#[tokio::test]
async fn expert_task_walks_submitted_working_completed() {
    let store = Arc::new(RecordingStore::default());
    let handler = DefaultRequestHandler::new(
        store.clone(),
        Arc::new(expert(vec![Ok(LlmResponse::from_text("Vision AI costs $8,000/month."))])),
    );

    let task = handler.on_send_message(blocking("How much is Vision AI?")).await.unwrap();

    assert_eq!(task.status.state, TaskState::Completed);
    assert_eq!(task.status.message_text(), Some("Vision AI costs $8,000/month."));
    assert_eq!(
        store.states(),
        [TaskState::Submitted, TaskState::Working, TaskState::Completed]
    );
}

#[tokio::test]
async fn reasoning_error_fails_the_task() {
    let store = Arc::new(RecordingStore::default());
    let handler = DefaultRequestHandler::new(
        store.clone(),
        Arc::new(expert(vec![Err(AgentError::LlmAuthentication {
            provider: "OpenAI".into(),
        })])),
    );

    let task = handler.on_send_message(blocking("anything")).await.unwrap();

    assert_eq!(task.status.state, TaskState::Failed);
    let text = task.status.message_text().unwrap();
    assert!(text.starts_with("Error while processing the request:"));
    assert!(text.contains("OpenAI"));
    assert_eq!(store.states(), [TaskState::Submitted, TaskState::Working, TaskState::Failed]);
}

#[tokio::test]
async fn get_is_idempotent_on_terminal_tasks() {
    let handler = DefaultRequestHandler::new(
        Arc::new(InMemoryTaskStore::new()),
        Arc::new(expert(vec![Ok(LlmResponse::from_text("done"))])),
    );
    let task = handler.on_send_message(blocking("hi")).await.unwrap();

    let first = handler.on_get_task(TaskQueryParams::new(task.id.clone())).await.unwrap();
    let second = handler.on_get_task(TaskQueryParams::new(task.id.clone())).await.unwrap();
    assert_eq!(first.status, second.status);
    assert_eq!(first.status.state, TaskState::Completed);
}

#[tokio::test]
async fn history_length_keeps_latest_messages() {
    let handler = DefaultRequestHandler::new(
        Arc::new(InMemoryTaskStore::new()),
        Arc::new(expert(vec![Ok(LlmResponse::from_text("done"))])),
    );
    let task = handler.on_send_message(blocking("hi")).await.unwrap();

    let mut query = TaskQueryParams::new(task.id.clone());
    query.history_length = Some(0);
    let trimmed = handler.on_get_task(query).await.unwrap();
    assert!(trimmed.history.is_empty());

    let full = handler.on_get_task(TaskQueryParams::new(task.id)).await.unwrap();
    assert_eq!(full.history.len(), 1);
    assert_eq!(full.history[0].first_text(), Some("hi"));
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let handler = DefaultRequestHandler::new(Arc::new(InMemoryTaskStore::new()), Arc::new(expert(Vec::new())));

    let err = handler.on_get_task(TaskQueryParams::new("missing")).await.unwrap_err();
    assert!(matches!(err, AgentError::TaskNotFound { .. }));

    let err = handler.on_cancel_task(TaskIdParams::new("missing")).await.unwrap_err();
    assert!(matches!(err, AgentError::TaskNotFound { .. }));
}

#[tokio::test]
async fn finished_task_cannot_be_canceled() {
    let handler = DefaultRequestHandler::new(
        Arc::new(InMemoryTaskStore::new()),
        Arc::new(expert(vec![Ok(LlmResponse::from_text("done"))])),
    );
    let task = handler.on_send_message(blocking("hi")).await.unwrap();

    let err = handler.on_cancel_task(TaskIdParams::new(task.id)).await.unwrap_err();
    assert!(matches!(err, AgentError::TaskNotCancelable { .. }));
}

/// Holds the task in `working` until released.
struct GatedExecutor {
    gate: Arc<Notify>,
}

#[async_trait]
impl AgentExecutor for GatedExecutor {
    async fn execute(&self, context: RequestContext, event_queue: EventQueue) {
        let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
        updater.submit().unwrap();
        updater.start_work().unwrap();
        self.gate.notified().await;
        updater.complete("finished anyway").unwrap();
    }

    async fn cancel(&self, context: RequestContext, event_queue: EventQueue) {
        let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
        updater.cancel("stopped by request").unwrap();
    }
}

#[tokio::test]
async fn cancel_wins_over_late_completion() {
    let gate = Arc::new(Notify::new());
    let handler = DefaultRequestHandler::new(
        Arc::new(InMemoryTaskStore::new()),
        Arc::new(GatedExecutor { gate: gate.clone() }),
    );

    let params = MessageSendParams::new(Message::user_text("m-1", "long job"));
    let task = handler.on_send_message(params).await.unwrap();
    assert_eq!(task.status.state, TaskState::Submitted);

    let canceled = handler.on_cancel_task(TaskIdParams::new(task.id.clone())).await.unwrap();
    assert_eq!(canceled.status.state, TaskState::Canceled);
    assert_eq!(canceled.status.message_text(), Some("stopped by request"));

    gate.notify_one();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    let after = handler.on_get_task(TaskQueryParams::new(task.id)).await.unwrap();
    assert_eq!(after.status.state, TaskState::Canceled);
    assert_eq!(after.status.message_text(), Some("stopped by request"));
}
