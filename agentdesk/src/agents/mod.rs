//! The two agents and the protocol the manager uses to consult the expert.

pub mod consultation;
pub mod expert;
pub mod manager;

pub use consultation::{consultation_query, Consultation, ExpertConsultant, DEFAULT_EXPERT_URL};
pub use expert::{expert_card, ExpertAgent, ExpertExecutor};
pub use manager::{compose_email, manager_card, ManagerExecutor, ManagerReply};

use crate::errors::{AgentError, AgentResult};
use crate::runtime::{EventQueue, RequestContext, TaskUpdater};

/// An updater over `queue`, reopened first if it was already closed.
pub(crate) fn open_updater(queue: EventQueue, context: &RequestContext) -> TaskUpdater {
    let queue = if queue.is_closed() {
        tracing::warn!(task_id = %context.task_id, "event queue is closed, reopening");
        queue.reopen()
    } else {
        queue
    };
    TaskUpdater::new(queue, &context.task_id, &context.context_id)
}

/// Applies `transition`. If the queue turns out to be closed, swaps in a fresh
/// updater over a reopened queue and tries once more.
pub(crate) fn apply_or_reopen(
    updater: &mut TaskUpdater,
    context: &RequestContext,
    transition: impl Fn(&mut TaskUpdater) -> AgentResult<()>,
) -> AgentResult<()> {
    match transition(updater) {
        Err(AgentError::QueueClosed { .. }) => {
            tracing::warn!(task_id = %context.task_id, "event queue closed mid-task, reopening");
            *updater = TaskUpdater::new(
                updater.queue().reopen(),
                &context.task_id,
                &context.context_id,
            );
            transition(updater)
        }
        other => other,
    }
}

/// At most `max` characters of `text`, for log lines.
pub(crate) fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
