//! Conversions between task states and the status types stored and emitted.

use a2a_types::{Message, TaskState, TaskStatus, TaskStatusUpdateEvent};

/// A `TaskStatus` for `state`, stamped with the current time.
#[must_use]
pub fn status(state: TaskState, message: Option<Message>) -> TaskStatus {
    TaskStatus {
        state,
        timestamp: Some(now()),
        message,
    }
}

#[must_use]
pub fn submitted_status() -> TaskStatus {
    status(TaskState::Submitted, None)
}

/// Builds the event emitted for a status change. Terminal states are final.
#[must_use]
pub fn create_status_update_event(
    task_id: &str,
    context_id: &str,
    status: TaskStatus,
) -> TaskStatusUpdateEvent {
    let is_final = status.state.is_terminal();
    TaskStatusUpdateEvent {
        kind: a2a_types::STATUS_UPDATE_KIND.to_string(),
        task_id: task_id.to_string(),
        context_id: context_id.to_string(),
        status,
        is_final,
    }
}

/// Whether a stored task in `from` may be moved to `to`.
///
/// `submitted -> submitted` is accepted so that an executor announcing
/// submission of a task the handler already recorded is a no-op.
#[must_use]
pub const fn can_transition(from: TaskState, to: TaskState) -> bool {
    match from {
        TaskState::Submitted => true,
        TaskState::Working => !matches!(to, TaskState::Submitted),
        TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected => {
            false
        }
    }
}

/// Current UTC time in RFC 3339.
fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
