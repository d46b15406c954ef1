use a2a_types::{MessageSendParams, SendMessageResult, Task, TaskIdParams, TaskQueryParams};
use async_trait::async_trait;

use crate::error::A2AResult;

/// The calls a caller agent makes against another agent.
///
/// [`A2AClient`](crate::A2AClient) implements this over HTTP; tests and
/// in-process setups can provide their own.
#[async_trait]
pub trait RemoteAgent: Send + Sync {
    async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult>;

    async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task>;

    async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task>;
}
