//! Task persistence.
//!
//! The store is the only state shared between the request handler, the event
//! drain and concurrent `tasks/get` callers. Every mutation of one task runs
//! under that task's map entry lock, and a task in a terminal state is never
//! written again.

use a2a_types::{Message, Task, TaskState, TaskStatus};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::errors::{AgentError, AgentResult};
use crate::runtime::status_mapper::can_transition;

/// A change applied to a stored task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    /// Replaces the current status, message included.
    pub status: Option<TaskStatus>,
    pub append_history: Option<Message>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            append_history: None,
        }
    }

    pub fn message(message: Message) -> Self {
        Self {
            status: None,
            append_history: Some(message),
        }
    }
}

#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task and returns its id.
    async fn create(&self, task: Task) -> AgentResult<String>;

    async fn get(&self, task_id: &str) -> AgentResult<Task>;

    /// Applies `patch` and returns the updated task.
    async fn update(&self, task_id: &str, patch: TaskPatch) -> AgentResult<Task>;

    /// Every task sharing `context_id`, in no particular order.
    async fn list_context(&self, context_id: &str) -> AgentResult<Vec<Task>>;
}

/// Process-local [`TaskStore`] on a `DashMap`.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: DashMap<String, Task>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[async_trait::async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: Task) -> AgentResult<String> {
        match self.tasks.entry(task.id.clone()) {
            Entry::Occupied(existing) => {
                tracing::error!(task_id = %existing.key(), "refusing to overwrite an existing task");
                Err(AgentError::TaskAlreadyExists {
                    task_id: existing.key().clone(),
                })
            }
            Entry::Vacant(slot) => {
                let id = task.id.clone();
                slot.insert(task);
                Ok(id)
            }
        }
    }

    async fn get(&self, task_id: &str) -> AgentResult<Task> {
        self.tasks
            .get(task_id)
            .map(|task| task.value().clone())
            .ok_or_else(|| AgentError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }

    async fn update(&self, task_id: &str, patch: TaskPatch) -> AgentResult<Task> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| AgentError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        if let Some(status) = patch.status {
            let from = task.status.state;
            if !can_transition(from, status.state) {
                return Err(AgentError::InvalidTaskStateTransition {
                    from: from.to_string(),
                    to: status.state.to_string(),
                });
            }
            // Re-announcing submission keeps the original record.
            if !(from == TaskState::Submitted && status.state == TaskState::Submitted) {
                task.status = status;
            }
        }

        if let Some(message) = patch.append_history {
            task.history.push(message);
        }

        Ok(task.value().clone())
    }

    async fn list_context(&self, context_id: &str) -> AgentResult<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|item| item.value().context_id == context_id)
            .map(|item| item.value().clone())
            .collect())
    }
}
