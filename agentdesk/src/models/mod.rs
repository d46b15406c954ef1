pub mod base_llm;
pub mod llm_response;
pub mod providers;
pub mod thread;

pub use base_llm::BaseLlm;
pub use llm_response::{LlmResponse, TokenUsage};
pub use providers::{MistralLlm, OpenAILlm};
pub use thread::{Role, Thread, ToolCall, Turn};
