//! Document retrieval tool.
//!
//! The index itself lives behind an HTTP endpoint; this module only forwards
//! the model's query and turns every failure into text the model can read.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base_tool::{string_arg, BaseTool, FunctionDeclaration, ToolResult};
use crate::errors::{AgentError, AgentResult};

/// Returned when no index is configured.
pub const SEARCH_UNAVAILABLE: &str = "Document search is unavailable.";

/// A searchable company document index.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    async fn query(&self, query: &str) -> AgentResult<String>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(alias = "answer", alias = "result")]
    response: String,
}

/// Posts `{"query": ...}` to a retrieval service.
///
/// The service answers with `{"response": "..."}`; a plain-text body is
/// accepted as the answer too.
#[derive(Clone)]
pub struct HttpDocumentSearch {
    url: String,
    http: reqwest::Client,
}

impl HttpDocumentSearch {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentSearch for HttpDocumentSearch {
    async fn query(&self, query: &str) -> AgentResult<String> {
        let response = self
            .http
            .post(&self.url)
            .json(&SearchRequest { query })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::Network {
                operation: "document_search".to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(parsed) => Ok(parsed.response),
            Err(_) if !body.trim_start().starts_with('{') => Ok(body),
            Err(e) => Err(e.into()),
        }
    }
}

/// The `search_documents` tool offered to the expert's model.
#[derive(Clone, Default)]
pub struct DocumentSearchTool {
    index: Option<Arc<dyn DocumentSearch>>,
}

impl DocumentSearchTool {
    pub fn new(index: Option<Arc<dyn DocumentSearch>>) -> Self {
        Self { index }
    }

    /// A tool that always answers with [`SEARCH_UNAVAILABLE`].
    pub fn unavailable() -> Self {
        Self { index: None }
    }

    pub fn is_available(&self) -> bool {
        self.index.is_some()
    }

    /// Runs `query` against the index. Never fails; errors become text.
    pub async fn search(&self, query: &str) -> String {
        let Some(index) = &self.index else {
            return SEARCH_UNAVAILABLE.to_string();
        };

        match index.query(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(query, error = %e, "document search failed");
                format!("Document search failed: {e}")
            }
        }
    }
}

#[async_trait]
impl BaseTool for DocumentSearchTool {
    fn name(&self) -> &str {
        "search_documents"
    }

    fn description(&self) -> &str {
        "Search the company documents for information relevant to a question."
    }

    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration::new(
            self.name(),
            self.description(),
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look for in the company documents"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn run_async(&self, args: HashMap<String, Value>) -> ToolResult {
        match string_arg(&args, "query") {
            Ok(query) => ToolResult::success(Value::String(self.search(query).await)),
            Err(missing) => missing,
        }
    }
}
