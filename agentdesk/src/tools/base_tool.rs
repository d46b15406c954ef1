use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Describes a tool's interface to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: Value,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub data: Value,
    pub error_message: Option<String>,
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            error_message: Some(message.into()),
        }
    }

    /// Text handed back to the model as the tool turn.
    ///
    /// Failures are reported as text too; a tool error never aborts reasoning.
    pub fn to_model_text(&self) -> String {
        if self.success {
            match &self.data {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }
        } else {
            self.error_message
                .clone()
                .unwrap_or_else(|| "Unknown tool error".to_string())
        }
    }
}

/// A capability the expert's model may invoke while answering.
#[async_trait]
pub trait BaseTool: Send + Sync {
    /// Unique within a toolset; the model calls the tool by this name.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn declaration(&self) -> FunctionDeclaration;

    async fn run_async(&self, args: HashMap<String, Value>) -> ToolResult;
}

/// Reads a required string argument.
pub(crate) fn string_arg<'a>(
    args: &'a HashMap<String, Value>,
    name: &str,
) -> Result<&'a str, ToolResult> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolResult::error(format!("Missing required string argument '{name}'")))
}
