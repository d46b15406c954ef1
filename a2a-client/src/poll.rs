//! Bounded polling of a remote task until it reaches a terminal state.
//!
//! The loop sleeps first, then fetches, so a task handle returned by
//! `message/send` in `submitted` state costs at least one interval before the
//! first `tasks/get`. Sleeping goes through [`Sleeper`] so tests can run the
//! loop without wall-clock delays.

use std::sync::Arc;
use std::time::Duration;

use a2a_types::{Task, TaskQueryParams};
use async_trait::async_trait;

use crate::constants::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use crate::error::A2AError;
use crate::remote::RemoteAgent;

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Upper bound on time spent sleeping.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How a poll loop ended. Every variant carries the last task snapshot seen.
#[derive(Debug)]
pub enum PollOutcome {
    /// A terminal state was observed.
    Finished(Task),
    /// The attempt ceiling was reached while the task was still running.
    Exhausted { task: Task, attempts: u32 },
    /// A `tasks/get` call failed and polling stopped.
    Interrupted { task: Task, error: A2AError },
}

impl PollOutcome {
    pub fn task(&self) -> &Task {
        match self {
            PollOutcome::Finished(task)
            | PollOutcome::Exhausted { task, .. }
            | PollOutcome::Interrupted { task, .. } => task,
        }
    }

    pub fn into_task(self) -> Task {
        match self {
            PollOutcome::Finished(task)
            | PollOutcome::Exhausted { task, .. }
            | PollOutcome::Interrupted { task, .. } => task,
        }
    }
}

/// Poll policy plus the sleeper that paces it.
#[derive(Clone)]
pub struct TaskPoller {
    policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for TaskPoller {
    fn default() -> Self {
        Self::new(PollPolicy::default())
    }
}

impl TaskPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Polls `agent` for `initial` until it is terminal or the ceiling is hit.
    pub async fn wait_for_terminal(&self, agent: &dyn RemoteAgent, initial: Task) -> PollOutcome {
        let mut task = initial;
        let mut attempts = 0;

        while !task.status.state.is_terminal() && attempts < self.policy.max_attempts {
            self.sleeper.sleep(self.policy.interval).await;
            attempts += 1;

            match agent.get_task(TaskQueryParams::new(task.id.clone())).await {
                Ok(latest) => {
                    tracing::debug!(
                        task_id = %latest.id,
                        state = %latest.status.state,
                        attempt = attempts,
                        "polled remote task"
                    );
                    task = latest;
                }
                Err(error) => {
                    tracing::warn!(task_id = %task.id, attempt = attempts, error = %error, "failed to poll remote task");
                    return PollOutcome::Interrupted { task, error };
                }
            }
        }

        if task.status.state.is_terminal() {
            PollOutcome::Finished(task)
        } else {
            PollOutcome::Exhausted { task, attempts }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::A2AResult;
    use a2a_types::{MessageSendParams, SendMessageResult, TaskIdParams, TaskState, TaskStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn task(state: TaskState) -> Task {
        Task {
            kind: "task".to_string(),
            id: "remote-1".to_string(),
            context_id: "ctx-1".to_string(),
            status: TaskStatus::new(state),
            history: Vec::new(),
            metadata: None,
        }
    }

    /// Serves scripted `tasks/get` results, repeating the last one forever.
    struct ScriptedAgent {
        script: Mutex<VecDeque<A2AResult<TaskState>>>,
        last: Mutex<TaskState>,
        gets: Mutex<u32>,
    }

    impl ScriptedAgent {
        fn new(script: Vec<A2AResult<TaskState>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(TaskState::Working),
                gets: Mutex::new(0),
            }
        }

        fn gets(&self) -> u32 {
            *self.gets.lock().unwrap()
        }
    }

    #[async_trait]
    impl RemoteAgent for ScriptedAgent {
        async fn send_message(&self, _params: MessageSendParams) -> A2AResult<SendMessageResult> {
            unreachable!("poller never sends")
        }

        async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
            assert_eq!(params.id, "remote-1");
            *self.gets.lock().unwrap() += 1;
            let next = self.script.lock().unwrap().pop_front();
            let state = match next {
                Some(Ok(state)) => state,
                Some(Err(err)) => return Err(err),
                None => *self.last.lock().unwrap(),
            };
            *self.last.lock().unwrap() = state;
            Ok(task(state))
        }

        async fn cancel_task(&self, _params: TaskIdParams) -> A2AResult<Task> {
            unreachable!("poller never cancels")
        }
    }

    #[derive(Default)]
    struct CountingSleeper {
        naps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for CountingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.naps.lock().unwrap().push(duration);
        }
    }

    fn poller(sleeper: Arc<CountingSleeper>) -> TaskPoller {
        TaskPoller::default().with_sleeper(sleeper)
    }

    #[tokio::test]
    async fn stops_on_completion() {
        let agent = ScriptedAgent::new(vec![
            Ok(TaskState::Working),
            Ok(TaskState::Working),
            Ok(TaskState::Completed),
        ]);
        let sleeper = Arc::new(CountingSleeper::default());

        let outcome = poller(sleeper.clone())
            .wait_for_terminal(&agent, task(TaskState::Submitted))
            .await;

        assert!(matches!(outcome, PollOutcome::Finished(ref t) if t.status.state == TaskState::Completed));
        assert_eq!(agent.gets(), 3);
        let naps = sleeper.naps.lock().unwrap();
        assert_eq!(naps.len(), 3);
        assert!(naps.iter().all(|d| *d == Duration::from_millis(500)));
    }

    #[tokio::test]
    async fn any_terminal_state_ends_the_loop() {
        let agent = ScriptedAgent::new(vec![Ok(TaskState::Rejected)]);
        let sleeper = Arc::new(CountingSleeper::default());

        let outcome = poller(sleeper.clone())
            .wait_for_terminal(&agent, task(TaskState::Working))
            .await;

        assert!(matches!(outcome, PollOutcome::Finished(ref t) if t.status.state == TaskState::Rejected));
        assert_eq!(agent.gets(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_ceiling() {
        let agent = ScriptedAgent::new(Vec::new());
        let sleeper = Arc::new(CountingSleeper::default());

        let outcome = poller(sleeper.clone())
            .wait_for_terminal(&agent, task(TaskState::Submitted))
            .await;

        match outcome {
            PollOutcome::Exhausted { task, attempts } => {
                assert_eq!(attempts, 20);
                assert_eq!(task.status.state, TaskState::Working);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(agent.gets(), 20);
        assert_eq!(sleeper.naps.lock().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn already_terminal_task_is_not_polled() {
        let agent = ScriptedAgent::new(Vec::new());
        let sleeper = Arc::new(CountingSleeper::default());

        let outcome = poller(sleeper.clone())
            .wait_for_terminal(&agent, task(TaskState::Completed))
            .await;

        assert!(matches!(outcome, PollOutcome::Finished(_)));
        assert_eq!(agent.gets(), 0);
        assert!(sleeper.naps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_error_interrupts_with_last_snapshot() {
        let agent = ScriptedAgent::new(vec![
            Ok(TaskState::Working),
            Err(A2AError::NetworkError {
                message: "connection reset".to_string(),
            }),
        ]);
        let sleeper = Arc::new(CountingSleeper::default());

        let outcome = poller(sleeper)
            .wait_for_terminal(&agent, task(TaskState::Submitted))
            .await;

        match outcome {
            PollOutcome::Interrupted { task, error } => {
                assert_eq!(task.status.state, TaskState::Working);
                assert!(error.is_transport());
            }
            other => panic!("expected interruption, got {other:?}"),
        }
    }

    #[test]
    fn default_budget_is_ten_seconds() {
        assert_eq!(PollPolicy::default().budget(), Duration::from_secs(10));
    }
}
