//! Wire format shared by OpenAI-compatible chat completion APIs.
//!
//! `OpenAI` and Mistral accept the same request and response shapes, so the
//! providers only differ in endpoint, credential and defaults.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};
use crate::models::{LlmResponse, Role, Thread, TokenUsage, ToolCall};
use crate::tools::BaseToolset;

/// Per-request knobs a provider forwards into the payload.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RequestOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask for a JSON object instead of free text.
    pub json_output: bool,
}

pub(crate) async fn build_payload(
    model_name: &str,
    thread: Thread,
    toolset: Option<Arc<dyn BaseToolset>>,
    options: RequestOptions,
) -> Value {
    let (system_prompt, turns) = thread.into_parts();
    let mut messages = Vec::with_capacity(turns.len() + 1);

    if let Some(system) = system_prompt {
        messages.push(json!({ "role": "system", "content": system }));
    }

    for turn in turns {
        match turn.role() {
            Role::User => {
                messages.push(json!({
                    "role": "user",
                    "content": turn.content().unwrap_or_default()
                }));
            }
            Role::Assistant => {
                let mut message = json!({
                    "role": "assistant",
                    "content": turn.content().unwrap_or_default()
                });
                if !turn.tool_calls().is_empty() {
                    let calls: Vec<Value> = turn
                        .tool_calls()
                        .iter()
                        .map(|call| {
                            json!({
                                "type": "function",
                                "id": call.id(),
                                "function": {
                                    "name": call.name(),
                                    "arguments": call.arguments().to_string()
                                }
                            })
                        })
                        .collect();
                    message["tool_calls"] = json!(calls);
                }
                messages.push(message);
            }
            Role::Tool => {
                messages.push(json!({
                    "role": "tool",
                    "content": turn.content().unwrap_or_default(),
                    "tool_call_id": turn.tool_call_id().unwrap_or_default()
                }));
            }
        }
    }

    let mut payload = json!({
        "model": model_name,
        "messages": messages
    });

    if let Some(temperature) = options.temperature {
        payload["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = options.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    if options.json_output {
        payload["response_format"] = json!({ "type": "json_object" });
    }

    if let Some(toolset) = toolset {
        let tools: Vec<Value> = toolset
            .get_tools()
            .await
            .iter()
            .map(|tool| {
                let decl = tool.declaration();
                json!({
                    "type": "function",
                    "function": {
                        "name": decl.name,
                        "description": decl.description,
                        "parameters": decl.parameters
                    }
                })
            })
            .collect();
        if !tools.is_empty() {
            payload["tools"] = json!(tools);
        }
    }

    payload
}

/// Posts `payload` and turns the reply into an [`LlmResponse`].
pub(crate) async fn send(
    http: &reqwest::Client,
    provider: &str,
    url: &str,
    api_key: &str,
    payload: &Value,
) -> AgentResult<LlmResponse> {
    let response = http
        .post(url)
        .bearer_auth(api_key)
        .json(payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        return Err(match status.as_u16() {
            401 | 403 => AgentError::LlmAuthentication {
                provider: provider.to_string(),
            },
            429 => AgentError::LlmRateLimit {
                provider: provider.to_string(),
            },
            _ => AgentError::LlmProvider {
                provider: provider.to_string(),
                message: format!("HTTP {status}: {error_body}"),
            },
        });
    }

    let body: Value = response.json().await?;
    parse_response(provider, &body)
}

pub(crate) fn parse_response(provider: &str, body: &Value) -> AgentResult<LlmResponse> {
    let provider_error = |message: &str| AgentError::LlmProvider {
        provider: provider.to_string(),
        message: message.to_string(),
    };

    let message = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| provider_error("Missing 'choices[0].message' in response"))?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        for call in calls {
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| provider_error("Missing 'id' in tool call"))?;
            let function = call
                .get("function")
                .ok_or_else(|| provider_error("Missing 'function' in tool call"))?;
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| provider_error("Missing 'name' in tool call function"))?;

            // Arguments arrive as a JSON-encoded string from both providers.
            let arguments = match function.get("arguments").cloned().unwrap_or(Value::Null) {
                Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::Null),
                other => other,
            };

            tool_calls.push(ToolCall::new(id, name, arguments));
        }
    }

    Ok(LlmResponse::new(text, tool_calls, parse_usage(body)))
}

fn parse_usage(body: &Value) -> TokenUsage {
    let Some(usage) = body.get("usage") else {
        return TokenUsage::empty();
    };
    let count = |field: &str| {
        usage
            .get(field)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };

    TokenUsage::partial(
        count("prompt_tokens"),
        count("completion_tokens"),
        count("total_tokens"),
    )
}
