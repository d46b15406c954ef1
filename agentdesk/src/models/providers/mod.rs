//! LLM provider implementations.
//!
//! - [`OpenAILlm`]: GPT models, used by the company expert
//! - [`MistralLlm`]: Mistral models, used by the sales manager

mod chat_completions;
mod mistral_llm;
mod openai_llm;

pub use mistral_llm::MistralLlm;
pub use openai_llm::OpenAILlm;
