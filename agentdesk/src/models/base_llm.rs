//! Base LLM trait for content generation.
//!
//! Both agents reason through a [`BaseLlm`]; the concrete provider is chosen
//! by the binary at startup and replaced with a fake in tests.

use std::sync::Arc;

use crate::errors::AgentResult;
use crate::models::{LlmResponse, Thread};
use crate::tools::BaseToolset;

/// Base trait for Large Language Model implementations.
///
/// Implementors map provider failures into
/// [`AgentError`](crate::errors::AgentError) variants; callers decide whether
/// a failure fails the task or triggers a fallback.
#[async_trait::async_trait]
pub trait BaseLlm: Send + Sync {
    /// Stable model identifier, used in logs.
    fn model_name(&self) -> &str;

    /// Generates the next reply for `thread`.
    ///
    /// When `toolset` is given its tools are offered to the model, which may
    /// answer with tool calls instead of text.
    async fn generate_content(
        &self,
        thread: Thread,
        toolset: Option<Arc<dyn BaseToolset>>,
    ) -> AgentResult<LlmResponse>;
}
