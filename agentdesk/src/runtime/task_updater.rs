//! The only writer of task state.
//!
//! A [`TaskUpdater`] remembers the last state it emitted and refuses
//! transitions the lifecycle does not allow:
//!
//! ```text
//! (none) -> submitted -> working -> completed | failed | canceled | rejected
//! ```
//!
//! A fresh updater may also go straight to `working` or a terminal state, which
//! is how an executor resumes after reopening a closed queue.

use a2a_types::{Message, MessageRole, Part, TaskState};

use crate::errors::{AgentError, AgentResult};
use crate::runtime::event_queue::{EventQueue, TaskEvent};
use crate::runtime::status_mapper::{create_status_update_event, status};

pub struct TaskUpdater {
    queue: EventQueue,
    task_id: String,
    context_id: String,
    state: Option<TaskState>,
}

impl TaskUpdater {
    pub fn new(queue: EventQueue, task_id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            queue,
            task_id: task_id.into(),
            context_id: context_id.into(),
            state: None,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Last state this updater emitted.
    pub fn state(&self) -> Option<TaskState> {
        self.state
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn submit(&mut self) -> AgentResult<()> {
        if self.state.is_some() {
            return Err(self.invalid(TaskState::Submitted));
        }
        self.emit(TaskState::Submitted, None)
    }

    pub fn start_work(&mut self) -> AgentResult<()> {
        if self.state != Some(TaskState::Submitted) {
            return Err(self.invalid(TaskState::Working));
        }
        self.emit(TaskState::Working, None)
    }

    /// Moves to `working` or a terminal state, replacing the status message.
    pub fn update_status(&mut self, state: TaskState, message: Option<Message>) -> AgentResult<()> {
        let allowed = match self.state {
            Some(current) if current.is_terminal() => false,
            _ => state == TaskState::Working || state.is_terminal(),
        };
        if !allowed {
            return Err(self.invalid(state));
        }
        self.emit(state, message)
    }

    /// An agent message bound to this task.
    pub fn new_agent_message(&self, parts: Vec<Part>) -> Message {
        Message::with_parts(uuid::Uuid::new_v4().to_string(), MessageRole::Agent, parts)
            .with_context_id(self.context_id.clone())
            .with_task_id(self.task_id.clone())
    }

    /// Appends a message to the task history without changing its state.
    pub fn add_message(&self, message: Message) -> AgentResult<()> {
        self.queue.enqueue(TaskEvent::Message(message))
    }

    pub fn complete(&mut self, text: impl Into<String>) -> AgentResult<()> {
        let message = self.new_agent_message(vec![Part::text(text)]);
        self.update_status(TaskState::Completed, Some(message))
    }

    pub fn fail(&mut self, text: impl Into<String>) -> AgentResult<()> {
        let message = self.new_agent_message(vec![Part::text(text)]);
        self.update_status(TaskState::Failed, Some(message))
    }

    pub fn cancel(&mut self, text: impl Into<String>) -> AgentResult<()> {
        let message = self.new_agent_message(vec![Part::text(text)]);
        self.update_status(TaskState::Canceled, Some(message))
    }

    fn emit(&mut self, state: TaskState, message: Option<Message>) -> AgentResult<()> {
        let event = create_status_update_event(&self.task_id, &self.context_id, status(state, message));
        self.queue.enqueue(TaskEvent::StatusUpdate(event))?;
        tracing::debug!(task_id = %self.task_id, state = %state, "task status updated");
        self.state = Some(state);
        Ok(())
    }

    fn invalid(&self, to: TaskState) -> AgentError {
        AgentError::InvalidTaskStateTransition {
            from: self
                .state
                .map_or_else(|| "none".to_string(), |state| state.to_string()),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::event_queue::EventReceiver;

    fn updater() -> (TaskUpdater, EventReceiver) {
        let (queue, receiver) = EventQueue::new("task-1");
        (TaskUpdater::new(queue, "task-1", "ctx-1"), receiver)
    }

    async fn states(updater: TaskUpdater, mut receiver: EventReceiver) -> Vec<TaskState> {
        drop(updater);
        let mut seen = Vec::new();
        while let Some(event) = receiver.recv().await {
            if let TaskEvent::StatusUpdate(update) = event {
                seen.push(update.status.state);
            }
        }
        seen
    }

    #[tokio::test]
    async fn happy_path_emits_events_in_order() {
        let (mut updater, receiver) = updater();
        updater.submit().unwrap();
        updater.start_work().unwrap();
        updater.complete("done").unwrap();
        assert_eq!(updater.state(), Some(TaskState::Completed));

        assert_eq!(
            states(updater, receiver).await,
            vec![TaskState::Submitted, TaskState::Working, TaskState::Completed]
        );
    }

    #[tokio::test]
    async fn second_submit_is_rejected() {
        let (mut updater, _receiver) = updater();
        updater.submit().unwrap();
        let err = updater.submit().unwrap_err();
        assert!(matches!(err, AgentError::InvalidTaskStateTransition { .. }));
    }

    #[tokio::test]
    async fn start_work_requires_submission() {
        let (mut updater, _receiver) = updater();
        assert!(updater.start_work().is_err());
    }

    #[tokio::test]
    async fn terminal_state_is_final() {
        let (mut updater, receiver) = updater();
        updater.submit().unwrap();
        updater.fail("boom").unwrap();
        assert!(updater.update_status(TaskState::Working, None).is_err());
        assert!(updater.complete("late").is_err());

        assert_eq!(
            states(updater, receiver).await,
            vec![TaskState::Submitted, TaskState::Failed]
        );
    }

    #[tokio::test]
    async fn update_status_cannot_target_submitted() {
        let (mut updater, _receiver) = updater();
        assert!(updater.update_status(TaskState::Submitted, None).is_err());
    }

    #[tokio::test]
    async fn closed_queue_leaves_state_untouched() {
        let (mut updater, _receiver) = updater();
        updater.submit().unwrap();
        updater.queue().close();
        assert!(matches!(
            updater.start_work(),
            Err(AgentError::QueueClosed { .. })
        ));
        assert_eq!(updater.state(), Some(TaskState::Submitted));
    }

    #[test]
    fn agent_messages_carry_task_binding() {
        let (updater, _receiver) = updater();
        let message = updater.new_agent_message(vec![Part::text("hi")]);
        assert_eq!(message.role, MessageRole::Agent);
        assert_eq!(message.task_id.as_deref(), Some("task-1"));
        assert_eq!(message.context_id.as_deref(), Some("ctx-1"));
        assert_eq!(message.first_text(), Some("hi"));
    }
}
