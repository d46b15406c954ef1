/// Main error type for agentdesk agents
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // === LLM Provider Errors ===
    #[error("LLM provider error ({provider}): {message}")]
    LlmProvider { provider: String, message: String },

    #[error("LLM API authentication failed: {provider}")]
    LlmAuthentication { provider: String },

    #[error("LLM API rate limit exceeded: {provider}")]
    LlmRateLimit { provider: String },

    #[error("LLM returned an unusable response: {reason}")]
    MalformedLlmOutput { reason: String },

    // === Task Lifecycle Errors ===
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Task already exists: {task_id}")]
    TaskAlreadyExists { task_id: String },

    #[error("Invalid task state transition: {from} -> {to}")]
    InvalidTaskStateTransition { from: String, to: String },

    #[error("Task cannot be canceled: {task_id} is {state}")]
    TaskNotCancelable { task_id: String, state: String },

    #[error("Event queue closed for task {task_id}")]
    QueueClosed { task_id: String },

    // === Tool Errors ===
    #[error("Tool not found: {tool_name}")]
    ToolNotFound { tool_name: String },

    // === Configuration Errors ===
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Missing configuration: {field}")]
    MissingConfiguration { field: String },

    // === Network/IO Errors ===
    #[error("Network error: {operation}: {reason}")]
    Network { operation: String, reason: String },

    #[error("Serialization error: {format}: {reason}")]
    Serialization { format: String, reason: String },

    // === General System Errors ===
    #[error("Internal error: {component}: {reason}")]
    Internal { component: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Runtime Errors ===
    #[error("Server start failed: {0}")]
    ServerStartFailed(String),
}

/// Convenience type alias
pub type AgentResult<T> = std::result::Result<T, AgentError>;

impl From<serde_json::Error> for AgentError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            format: "json".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<std::io::Error> for AgentError {
    fn from(error: std::io::Error) -> Self {
        Self::Internal {
            component: "io".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for AgentError {
    fn from(error: tokio::task::JoinError) -> Self {
        let reason = if error.is_cancelled() {
            "task cancelled".to_string()
        } else if error.is_panic() {
            "task panicked".to_string()
        } else {
            error.to_string()
        };

        Self::Internal {
            component: "task".to_string(),
            reason,
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network {
            operation: "http_request".to_string(),
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_to_string_contains_context() {
        let err = AgentError::InvalidConfiguration {
            field: "api_key".into(),
            reason: "missing".into(),
        };
        let message = err.to_string();
        assert!(message.contains("api_key"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = AgentError::InvalidTaskStateTransition {
            from: "completed".into(),
            to: "working".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid task state transition: completed -> working"
        );
    }
}
