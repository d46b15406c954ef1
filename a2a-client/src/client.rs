//! JSON-RPC client for a remote A2A agent.
//!
//! The client is built from the agent's card: the card's `url` becomes the
//! endpoint for every `message/send`, `tasks/get` and `tasks/cancel` call.

use crate::constants::{AGENT_CARD_PATH, DEFAULT_REQUEST_TIMEOUT, JSONRPC_VERSION};
use crate::error::{A2AError, A2AResult};
use crate::remote::RemoteAgent;
use a2a_types::{
    AgentCard, JSONRPCId, JSONRPCResponse, MessageSendParams, SendMessageResult, Task,
    TaskIdParams, TaskQueryParams,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A2A client for communicating with one remote agent
#[derive(Clone)]
pub struct A2AClient {
    client: Client,
    /// Service endpoint URL from agent card
    service_endpoint_url: String,
    auth_token: Option<String>,
    request_id_counter: Arc<AtomicU64>,
    agent_card: Arc<AgentCard>,
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'static str,
    id: JSONRPCId,
    method: &'a str,
    params: T,
}

/// Builds the HTTP client used when the caller does not supply one.
pub fn default_http_client() -> A2AResult<Client> {
    Client::builder()
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| A2AError::NetworkError {
            message: format!("Failed to build HTTP client: {e}"),
        })
}

fn card_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), AGENT_CARD_PATH)
}

impl A2AClient {
    /// Fetches the agent card under `base_url` and targets the endpoint it names.
    ///
    /// ```no_run
    /// use a2a_client::A2AClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = A2AClient::from_card_url("http://localhost:10007").await?;
    /// println!("talking to {}", client.agent_card().name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from_card_url(base_url: impl AsRef<str>) -> A2AResult<Self> {
        Self::from_card_url_with_client(base_url, default_http_client()?).await
    }

    /// Same as [`from_card_url`](Self::from_card_url) with a caller-configured HTTP client.
    pub async fn from_card_url_with_client(
        base_url: impl AsRef<str>,
        http_client: Client,
    ) -> A2AResult<Self> {
        let agent_card = fetch_card(&http_client, base_url.as_ref(), None).await?;
        Self::from_card_with_client(agent_card, http_client)
    }

    /// Builds a client from a card the caller already holds.
    pub fn from_card(agent_card: AgentCard) -> A2AResult<Self> {
        Self::from_card_with_client(agent_card, default_http_client()?)
    }

    pub fn from_card_with_client(agent_card: AgentCard, http_client: Client) -> A2AResult<Self> {
        if agent_card.url.is_empty() {
            return Err(A2AError::InvalidParameter {
                message: "Agent card does not contain a valid 'url' for the service endpoint"
                    .to_string(),
            });
        }

        Ok(Self {
            client: http_client,
            service_endpoint_url: agent_card.url.clone(),
            auth_token: None,
            request_id_counter: Arc::new(AtomicU64::new(1)),
            agent_card: Arc::new(agent_card),
        })
    }

    /// Set authentication token (builder pattern)
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Get the cached agent card
    pub fn agent_card(&self) -> &AgentCard {
        &self.agent_card
    }

    /// Fetch a fresh agent card from the base URL
    pub async fn fetch_agent_card(&self, base_url: impl AsRef<str>) -> A2AResult<AgentCard> {
        fetch_card(&self.client, base_url.as_ref(), self.auth_token.as_deref()).await
    }

    fn next_request_id(&self) -> JSONRPCId {
        let id = self.request_id_counter.fetch_add(1, Ordering::SeqCst);
        JSONRPCId::Integer(id as i64)
    }

    async fn post_rpc_request<TParams, TResult>(
        &self,
        method: &str,
        params: TParams,
    ) -> A2AResult<TResult>
    where
        TParams: Serialize,
        TResult: DeserializeOwned,
    {
        let request_id = self.next_request_id();
        let rpc_request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: request_id.clone(),
            method,
            params,
        };

        let mut req = self
            .client
            .post(&self.service_endpoint_url)
            .header("Accept", "application/json")
            .json(&rpc_request);

        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| A2AError::NetworkError {
            message: format!("Failed to send {method} request: {e}"),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| A2AError::NetworkError {
            message: format!("Failed to read {method} response: {e}"),
        })?;

        let parsed: JSONRPCResponse<TResult> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(A2AError::NetworkError {
                    message: format!("HTTP error {status}: {body}"),
                });
            }
            Err(e) => {
                return Err(A2AError::SerializationError {
                    message: format!("Failed to parse {method} response: {e}"),
                });
            }
        };

        match parsed {
            JSONRPCResponse::Success(success) => {
                if success.id.as_ref().is_some_and(|id| id != &request_id) {
                    tracing::warn!(
                        method,
                        expected = ?request_id,
                        received = ?success.id,
                        "JSON-RPC response id mismatch"
                    );
                }
                Ok(success.result)
            }
            JSONRPCResponse::Error(err) => Err(A2AError::RemoteAgentError {
                message: err.error.message,
                code: Some(err.error.code),
            }),
        }
    }

    /// Send a message; the agent answers with a task handle or a direct reply.
    pub async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        self.post_rpc_request("message/send", params).await
    }

    /// Get the current state of a task.
    pub async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        self.post_rpc_request("tasks/get", params).await
    }

    /// Cancel a task by its ID
    pub async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        self.post_rpc_request("tasks/cancel", params).await
    }
}

async fn fetch_card(client: &Client, base_url: &str, token: Option<&str>) -> A2AResult<AgentCard> {
    let card_url = card_url(base_url);

    let mut req = client.get(&card_url).header("Accept", "application/json");
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }

    let response = req.send().await.map_err(|e| A2AError::NetworkError {
        message: format!("Failed to fetch agent card from {card_url}: {e}"),
    })?;

    if !response.status().is_success() {
        return Err(A2AError::NetworkError {
            message: format!("Failed to fetch agent card: HTTP {}", response.status()),
        });
    }

    response
        .json()
        .await
        .map_err(|e| A2AError::SerializationError {
            message: format!("Failed to parse agent card: {e}"),
        })
}

#[async_trait]
impl RemoteAgent for A2AClient {
    async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        A2AClient::send_message(self, params).await
    }

    async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        A2AClient::get_task(self, params).await
    }

    async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        A2AClient::cancel_task(self, params).await
    }
}
