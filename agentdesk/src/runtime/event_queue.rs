//! Per-task channel carrying updater events to the store.
//!
//! A queue can be closed independently of the channel behind it. Once closed,
//! [`EventQueue::enqueue`] fails with [`AgentError::QueueClosed`]; an executor
//! that hits this calls [`EventQueue::reopen`] and keeps going, and the events
//! it sends afterwards still reach the same [`EventReceiver`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use a2a_types::{Message, TaskStatusUpdateEvent};
use tokio::sync::mpsc;

use crate::errors::{AgentError, AgentResult};

/// Something that happened to a task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    StatusUpdate(TaskStatusUpdateEvent),
    /// A standalone agent message, appended to the task history.
    Message(Message),
}

impl TaskEvent {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskEvent::StatusUpdate(update) => Some(&update.task_id),
            TaskEvent::Message(message) => message.task_id.as_deref(),
        }
    }
}

/// Sending half, owned by the executor working on the task.
#[derive(Debug)]
pub struct EventQueue {
    task_id: String,
    sender: mpsc::UnboundedSender<TaskEvent>,
    closed: Arc<AtomicBool>,
}

/// Receiving half, drained by the request handler.
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::UnboundedReceiver<TaskEvent>,
}

impl EventQueue {
    pub fn new(task_id: impl Into<String>) -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            task_id: task_id.into(),
            sender,
            closed: Arc::new(AtomicBool::new(false)),
        };
        (queue, EventReceiver { receiver })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn enqueue(&self, event: TaskEvent) -> AgentResult<()> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        self.sender.send(event).map_err(|_| self.closed_error())
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Closed explicitly, or nobody is draining any more.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.sender.is_closed()
    }

    /// A fresh open queue for the same task and the same receiver.
    #[must_use]
    pub fn reopen(&self) -> Self {
        Self {
            task_id: self.task_id.clone(),
            sender: self.sender.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn closed_error(&self) -> AgentError {
        AgentError::QueueClosed {
            task_id: self.task_id.clone(),
        }
    }
}

impl EventReceiver {
    /// Next event, or `None` once every queue for the task has been dropped.
    pub async fn recv(&mut self) -> Option<TaskEvent> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::status_mapper::{create_status_update_event, status};
    use a2a_types::TaskState;

    fn working() -> TaskEvent {
        TaskEvent::StatusUpdate(create_status_update_event(
            "task-1",
            "ctx-1",
            status(TaskState::Working, None),
        ))
    }

    #[tokio::test]
    async fn closed_queue_rejects_events() {
        let (queue, _receiver) = EventQueue::new("task-1");
        queue.close();
        match queue.enqueue(working()) {
            Err(AgentError::QueueClosed { task_id }) => assert_eq!(task_id, "task-1"),
            other => panic!("expected QueueClosed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reopened_queue_feeds_the_same_receiver() {
        let (queue, mut receiver) = EventQueue::new("task-1");
        queue.enqueue(working()).unwrap();
        queue.close();

        let reopened = queue.reopen();
        assert!(!reopened.is_closed());
        reopened.enqueue(working()).unwrap();
        drop(queue);
        drop(reopened);

        assert!(receiver.recv().await.is_some());
        assert!(receiver.recv().await.is_some());
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropped_receiver_closes_queue() {
        let (queue, receiver) = EventQueue::new("task-1");
        drop(receiver);
        assert!(queue.is_closed());
        assert!(queue.enqueue(working()).is_err());
    }
}
