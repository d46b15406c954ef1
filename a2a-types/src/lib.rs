//! # A2A wire types
//!
//! Serde data structures for the subset of the Agent2Agent (A2A) protocol that
//! agentdesk agents speak to each other: JSON-RPC 2.0 envelopes, the task
//! lifecycle (`Task`, `TaskStatus`, `TaskState`), messages and their parts,
//! the `message/send` / `tasks/get` / `tasks/cancel` parameter types, and the
//! discovery document (`AgentCard`).
//!
//! Field names follow the camelCase JSON form used on the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod agent_card;
pub use agent_card::{
    AgentCapabilities, AgentCard, AgentProvider, AgentSkill, SecurityScheme, TransportProtocol,
};

/// A2A protocol revision advertised in agent cards.
pub const PROTOCOL_VERSION: &str = "0.3.0";
/// JSON-RPC protocol version. Always "2.0".
pub const JSONRPC_VERSION: &str = "2.0";
pub const TASK_KIND: &str = "task";
pub const MESSAGE_KIND: &str = "message";
pub const STATUS_UPDATE_KIND: &str = "status-update";

// ============================================================================
// JSON-RPC 2.0
// ============================================================================

/// A JSON-RPC identifier: string, number, or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JSONRPCId {
    String(String),
    Integer(i64),
    Null,
}

/// Standard JSON-RPC and A2A-specific error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const TASK_NOT_FOUND: i32 = -32001;
    pub const TASK_NOT_CANCELABLE: i32 = -32002;
    pub const PUSH_NOTIFICATION_NOT_SUPPORTED: i32 = -32003;
    pub const UNSUPPORTED_OPERATION: i32 = -32004;
}

/// The error object carried by a JSON-RPC error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JSONRPCError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(error_codes::PARSE_ERROR, "Invalid JSON payload")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            error_codes::TASK_NOT_FOUND,
            format!("Task not found: {task_id}"),
        )
    }

    pub fn task_not_cancelable(task_id: &str) -> Self {
        Self::new(
            error_codes::TASK_NOT_CANCELABLE,
            format!("Task cannot be canceled: {task_id}"),
        )
    }

    pub fn unsupported_operation(operation: &str) -> Self {
        Self::new(
            error_codes::UNSUPPORTED_OPERATION,
            format!("This operation is not supported: {operation}"),
        )
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCErrorResponse {
    pub jsonrpc: String,
    pub error: JSONRPCError,
    pub id: Option<JSONRPCId>,
}

impl JSONRPCErrorResponse {
    pub fn new(id: Option<JSONRPCId>, error: JSONRPCError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            error,
            id,
        }
    }
}

/// A successful JSON-RPC response carrying a typed result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCSuccessResponse<T> {
    pub jsonrpc: String,
    pub result: T,
    pub id: Option<JSONRPCId>,
}

impl<T> JSONRPCSuccessResponse<T> {
    pub fn new(id: Option<JSONRPCId>, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result,
            id,
        }
    }
}

/// Either side of a JSON-RPC exchange, as seen by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JSONRPCResponse<T> {
    Success(JSONRPCSuccessResponse<T>),
    Error(JSONRPCErrorResponse),
}

// ============================================================================
// Task lifecycle
// ============================================================================

/// Lifecycle states of a task.
///
/// `Submitted` is the only initial state. The last four are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    Completed,
    Failed,
    Canceled,
    Rejected,
}

impl TaskState {
    /// True for the four outcome states that admit no further transition.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a task at a point in time, with the message attached at that transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,
    /// RFC 3339 timestamp of the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            timestamp: None,
            message: None,
        }
    }

    /// First text part of the status message, if any.
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_ref().and_then(Message::first_text)
    }
}

/// One unit of requested agent work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    #[serde(default = "default_task_kind")]
    pub kind: String,
    pub id: String,
    #[serde(rename = "contextId")]
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub history: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

fn default_task_kind() -> String {
    TASK_KIND.to_string()
}

/// Emitted whenever a task's status changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatusUpdateEvent {
    #[serde(default = "default_status_update_kind")]
    pub kind: String,
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "contextId")]
    pub context_id: String,
    pub status: TaskStatus,
    /// Set on the event that carries a terminal state.
    #[serde(rename = "final")]
    pub is_final: bool,
}

fn default_status_update_kind() -> String {
    STATUS_UPDATE_KIND.to_string()
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

/// A single exchange between a user and an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default = "default_message_kind")]
    pub kind: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub role: MessageRole,
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "contextId")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "taskId")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

fn default_message_kind() -> String {
    MESSAGE_KIND.to_string()
}

impl Message {
    /// A user message with a single text part.
    pub fn user_text(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_parts(message_id, MessageRole::User, vec![Part::text(text)])
    }

    /// An agent message with a single text part.
    pub fn agent_text(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_parts(message_id, MessageRole::Agent, vec![Part::text(text)])
    }

    pub fn with_parts(message_id: impl Into<String>, role: MessageRole, parts: Vec<Part>) -> Self {
        Self {
            kind: MESSAGE_KIND.to_string(),
            message_id: message_id.into(),
            role,
            parts,
            context_id: None,
            task_id: None,
            metadata: None,
        }
    }

    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// The first text part, which is where both agents read their input.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }
}

/// A typed fragment of a message. Text is the only kind agents act on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    Data {
        data: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            Part::Data { .. } => None,
        }
    }
}

// ============================================================================
// Method parameters
// ============================================================================

/// Parameters of `message/send`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl MessageSendParams {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            configuration: None,
            metadata: None,
        }
    }

    /// Whether the caller asked to wait for the task to finish.
    pub fn is_blocking(&self) -> bool {
        self.configuration
            .as_ref()
            .and_then(|c| c.blocking)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MessageSendConfiguration {
    /// Wait for the task to reach a terminal state before responding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<i32>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        rename = "acceptedOutputModes",
        default
    )]
    pub accepted_output_modes: Vec<String>,
}

/// Parameters of `tasks/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskIdParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl TaskIdParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: None,
        }
    }
}

/// Parameters of `tasks/get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl TaskQueryParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history_length: None,
            metadata: None,
        }
    }
}

// ============================================================================
// Requests and results
// ============================================================================

fn default_jsonrpc_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// A complete A2A JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct A2ARequest {
    #[serde(default = "default_jsonrpc_version")]
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JSONRPCId>,
    #[serde(flatten)]
    pub payload: A2ARequestPayload,
}

/// Request payloads, tagged by `method`.
///
/// The streaming methods are recognized so they can be answered with an
/// unsupported-operation error rather than method-not-found.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum A2ARequestPayload {
    #[serde(rename = "message/send")]
    SendMessage { params: MessageSendParams },
    #[serde(rename = "message/stream")]
    SendStreamingMessage { params: MessageSendParams },
    #[serde(rename = "tasks/get")]
    GetTask { params: TaskQueryParams },
    #[serde(rename = "tasks/cancel")]
    CancelTask { params: TaskIdParams },
    #[serde(rename = "tasks/resubscribe")]
    TaskResubscription { params: TaskIdParams },
}

impl A2ARequestPayload {
    /// Every method name this crate can parse.
    pub const METHODS: [&'static str; 5] = [
        "message/send",
        "message/stream",
        "tasks/get",
        "tasks/cancel",
        "tasks/resubscribe",
    ];

    pub fn method(&self) -> &'static str {
        match self {
            A2ARequestPayload::SendMessage { .. } => "message/send",
            A2ARequestPayload::SendStreamingMessage { .. } => "message/stream",
            A2ARequestPayload::GetTask { .. } => "tasks/get",
            A2ARequestPayload::CancelTask { .. } => "tasks/cancel",
            A2ARequestPayload::TaskResubscription { .. } => "tasks/resubscribe",
        }
    }
}

/// Result of `message/send`: a task handle or a direct reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SendMessageResult {
    Task(Task),
    Message(Message),
}
