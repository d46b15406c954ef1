//! Mistral LLM provider implementation.
//!
//! API Documentation: <https://docs.mistral.ai/api/#tag/chat>

use std::sync::Arc;

use crate::config::EnvKey;
use crate::errors::AgentResult;
use crate::models::providers::chat_completions::{self, RequestOptions};
use crate::models::{BaseLlm, LlmResponse, Thread};
use crate::tools::BaseToolset;

const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const PROVIDER: &str = "Mistral";

/// Mistral chat completions. The manager uses it in JSON mode to get a
/// structured reply.
pub struct MistralLlm {
    model_name: String,
    api_key: String,
    base_url: String,
    options: RequestOptions,
    http: reqwest::Client,
}

impl MistralLlm {
    /// Environment variable holding the Mistral API key.
    pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            api_key: api_key.into(),
            base_url: MISTRAL_BASE_URL.to_string(),
            options: RequestOptions::default(),
            http: reqwest::Client::new(),
        }
    }

    /// Reads the key from `MISTRAL_API_KEY`; unset or blank is a configuration error.
    pub fn from_env(model_name: impl Into<String>) -> AgentResult<Self> {
        let api_key = EnvKey::new(Self::API_KEY_ENV).resolve()?;
        Ok(Self::new(model_name, api_key))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Constrains replies to a single JSON object.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.options.json_output = true;
        self
    }
}

#[async_trait::async_trait]
impl BaseLlm for MistralLlm {
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
