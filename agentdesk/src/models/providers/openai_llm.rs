//! `OpenAI` LLM provider implementation.
//!
//! API Documentation: <https://platform.openai.com/docs/api-reference/chat>

use std::sync::Arc;

use crate::config::EnvKey;
use crate::errors::AgentResult;
use crate::models::providers::chat_completions::{self, RequestOptions};
use crate::models::{BaseLlm, LlmResponse, Thread};
use crate::tools::BaseToolset;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "OpenAI";

/// `OpenAI` chat completions, with tool calling. The expert reasons with this.
///
/// ```ignore
/// use agentdesk::models::{BaseLlm, OpenAILlm, Thread};
///
/// let llm = OpenAILlm::from_env("gpt-4o-mini")?;
/// let response = llm.generate_content(Thread::from_user("Hello"), None).await?;
/// ```
pub struct OpenAILlm {
    model_name: String,
    api_key: String,
    base_url: String,
    options: RequestOptions,
    http: reqwest::Client,
}

impl OpenAILlm {
    /// Environment variable holding the `OpenAI` API key.
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            options: RequestOptions::default(),
            http: reqwest::Client::new(),
        }
    }

    /// Reads the key from `OPENAI_API_KEY`; unset or blank is a configuration error.
    pub fn from_env(model_name: impl Into<String>) -> AgentResult<Self> {
        let api_key = EnvKey::new(Self::API_KEY_ENV).resolve()?;
        Ok(Self::new(model_name, api_key))
    }

    /// Points the provider at an OpenAI-compatible gateway.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }
}

#[async_trait::async_trait]
impl BaseLlm for OpenAILlm {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        thread: Thread,
        toolset: Option<Arc<dyn BaseToolset>>,
    ) -> AgentResult<LlmResponse> {
        let payload =
            chat_completions::build_payload(&self.model_name, thread, toolset, self.options).await;
        chat_completions::send(&self.http, PROVIDER, &self.base_url, &self.api_key, &payload).await
    }
}
