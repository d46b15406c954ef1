//! Fakes for exercising the agents without models, sockets, or timers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use a2a_client::{A2AError, A2AResult, RemoteAgent, Sleeper};
use a2a_types::{
    Message, MessageRole, MessageSendParams, SendMessageResult, Task, TaskIdParams, TaskQueryParams, TaskState,
    TaskStatus,
};
use async_trait::async_trait;

use crate::errors::{AgentError, AgentResult};
use crate::models::{BaseLlm, LlmResponse, Thread};
use crate::runtime::error_mapper::to_jsonrpc_error;
use crate::runtime::DefaultRequestHandler;
use crate::tools::BaseToolset;

/// Replays scripted responses and records every thread it was asked about.
#[derive(Clone)]
pub struct FakeLlm {
    model: String,
    responses: Arc<Mutex<VecDeque<AgentResult<LlmResponse>>>>,
    calls: Arc<Mutex<Vec<Thread>>>,
}

impl FakeLlm {
    pub fn with_responses(
        model: impl Into<String>,
        responses: impl IntoIterator<Item = AgentResult<LlmResponse>>,
    ) -> Self {
        Self {
            model: model.into(),
            responses: Arc::new(Mutex::new(responses.into_iter().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Thread> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseLlm for FakeLlm {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        thread: Thread,
        _toolset: Option<Arc<dyn BaseToolset>>,
    ) -> AgentResult<LlmResponse> {
        self.calls.lock().unwrap().push(thread);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AgentError::LlmProvider {
                    provider: "fake".to_string(),
                    message: "no scripted response left".to_string(),
                })
            })
    }
}

#[derive(Debug, Clone)]
enum Behavior {
    /// Accepts, then reports `completed` with the text on the first poll.
    Answer(String),
    /// Accepts, then stays `working` forever.
    Stuck,
    /// Accepts, then ends in the given terminal state without text.
    End(TaskState),
    /// Replies with a message instead of a task.
    Direct(String),
    /// Fails the send with the given error.
    Refuse(A2AError),
}

/// Scripted remote agent with call recording.
#[derive(Clone)]
pub struct FakeRemoteAgent {
    behavior: Behavior,
    sent: Arc<Mutex<Vec<MessageSendParams>>>,
    gets: Arc<Mutex<u32>>,
}

impl FakeRemoteAgent {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            sent: Arc::new(Mutex::new(Vec::new())),
            gets: Arc::new(Mutex::new(0)),
        }
    }

    pub fn answering(text: impl Into<String>) -> Self {
        Self::new(Behavior::Answer(text.into()))
    }

    pub fn stuck() -> Self {
        Self::new(Behavior::Stuck)
    }

    pub fn ending_in(state: TaskState) -> Self {
        Self::new(Behavior::End(state))
    }

    pub fn replying_directly(text: impl Into<String>) -> Self {
        Self::new(Behavior::Direct(text.into()))
    }

    pub fn unreachable() -> Self {
        Self::new(Behavior::Refuse(A2AError::NetworkError {
            message: "connection refused".to_string(),
        }))
    }

    pub fn refusing(error: A2AError) -> Self {
        Self::new(Behavior::Refuse(error))
    }

    pub fn sent(&self) -> Vec<MessageSendParams> {
        self.sent.lock().unwrap().clone()
    }

    pub fn gets(&self) -> u32 {
        *self.gets.lock().unwrap()
    }

    fn task(&self, id: &str, state: TaskState, text: Option<&str>) -> Task {
        let mut status = TaskStatus::new(state);
        status.message = text.map(|t| Message::agent_text("fake-reply", t));
        Task {
            kind: "task".to_string(),
            id: id.to_string(),
            context_id: "fake-context".to_string(),
            status,
            history: Vec::new(),
            metadata: None,
        }
    }
}

#[async_trait]
impl RemoteAgent for FakeRemoteAgent {
    async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        assert_eq!(params.message.role, MessageRole::User);
        self.sent.lock().unwrap().push(params);
        match &self.behavior {
            Behavior::Refuse(error) => Err(error.clone()),
            Behavior::Direct(text) => Ok(SendMessageResult::Message(Message::agent_text("fake-reply", text))),
            _ => Ok(SendMessageResult::Task(self.task("fake-task", TaskState::Submitted, None))),
        }
    }

    async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        *self.gets.lock().unwrap() += 1;
        Ok(match &self.behavior {
            Behavior::Answer(text) => self.task(&params.id, TaskState::Completed, Some(text)),
            Behavior::End(state) => self.task(&params.id, *state, None),
            _ => self.task(&params.id, TaskState::Working, None),
        })
    }

    async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        Ok(self.task(&params.id, TaskState::Canceled, None))
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    naps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn naps(&self) -> Vec<Duration> {
        self.naps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.naps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// A request handler reachable through [`RemoteAgent`], without HTTP.
#[derive(Clone)]
pub struct InProcessAgent {
    handler: DefaultRequestHandler,
}

impl InProcessAgent {
    pub fn new(handler: DefaultRequestHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &DefaultRequestHandler {
        &self.handler
    }
}

fn remote_error(error: AgentError) -> A2AError {
    let rpc = to_jsonrpc_error(error);
    A2AError::RemoteAgentError {
        message: rpc.message,
        code: Some(rpc.code),
    }
}

#[async_trait]
impl RemoteAgent for InProcessAgent {
    async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        self.handler
            .on_send_message(params)
            .await
            .map(SendMessageResult::Task)
            .map_err(remote_error)
    }

    async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        self.handler.on_get_task(params).await.map_err(remote_error)
    }

    async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        self.handler.on_cancel_task(params).await.map_err(remote_error)
    }
}
